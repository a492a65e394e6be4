/*!
# Rule System

Rules are plugins: `meta()` describes a rule (id, docs, message
catalog, options schema) and `create()` builds its event listeners.
The engine owns a `Rules` registry; configs refer to rules by id and
activation fails for ids that were never registered.

## Usage

```rust,ignore
use astlint::rules::{Rule, RuleInit, RuleListeners, RuleMeta};
use astlint::linter::events::EventKey;
use astlint::parser::ast::NodeType;

struct NoDebugger;

impl Rule for NoDebugger {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new("no-debugger")
            .description("disallow debugger statements")
            .message("unexpected", "Unexpected 'debugger'.")
    }

    fn create(&self, _init: &RuleInit) -> RuleListeners {
        RuleListeners::new().enter(NodeType::Identifier, |ctx, event| {
            // inspect event.node(), call ctx.report(...)
            Ok(())
        })
    }
}
```
*/

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::core::errors::EngineError;
use crate::linter::context::RuleContext;
use crate::linter::events::{Event, EventKey};
use crate::parser::ast::NodeType;

/// Listener invoked when a subscribed event fires
pub type ListenerFn =
    Box<dyn FnMut(&mut RuleContext<'_, '_>, &Event<'_>) -> Result<(), EngineError>>;

/// Static description of a rule
#[derive(Debug, Clone, Default)]
pub struct RuleMeta {
    pub id: String,
    pub description: String,
    /// Message catalog: message id to template with `{{placeholder}}` slots
    pub messages: HashMap<String, String>,
    /// Options schema: one JSON-schema-like entry per positional option
    pub schema: Option<Vec<Value>>,
}

impl RuleMeta {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn message(mut self, id: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(id.into(), template.into());
        self
    }

    pub fn schema(mut self, schema: Vec<Value>) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Per-activation inputs handed to `create()`
pub struct RuleInit<'a> {
    /// Validated options from the config entry, severity stripped
    pub options: &'a [Value],
}

/// Listener set returned by `create()`
#[derive(Default)]
pub struct RuleListeners {
    pub(crate) entries: Vec<(EventKey, ListenerFn)>,
}

impl RuleListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, key: EventKey, listener: F) -> Self
    where
        F: FnMut(&mut RuleContext<'_, '_>, &Event<'_>) -> Result<(), EngineError> + 'static,
    {
        self.entries.push((key, Box::new(listener)));
        self
    }

    /// Subscribes to a node type's enter event
    pub fn enter<F>(self, node_type: NodeType, listener: F) -> Self
    where
        F: FnMut(&mut RuleContext<'_, '_>, &Event<'_>) -> Result<(), EngineError> + 'static,
    {
        self.on(EventKey::Enter(node_type), listener)
    }

    /// Subscribes to a node type's exit event
    pub fn exit<F>(self, node_type: NodeType, listener: F) -> Self
    where
        F: FnMut(&mut RuleContext<'_, '_>, &Event<'_>) -> Result<(), EngineError> + 'static,
    {
        self.on(EventKey::Exit(node_type), listener)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Rule plugin contract
pub trait Rule {
    fn meta(&self) -> RuleMeta;
    fn create(&self, init: &RuleInit<'_>) -> RuleListeners;
}

/// Registry of known rules, keyed by rule id
#[derive(Default)]
pub struct Rules {
    map: HashMap<String, Rc<dyn Rule>>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under its meta id, replacing any previous one
    pub fn define(&mut self, rule: Rc<dyn Rule>) {
        let id = rule.meta().id;
        self.map.insert(id, rule);
    }

    pub fn get(&self, id: &str) -> Option<Rc<dyn Rule>> {
        self.map.get(id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Validates config options against a rule's schema
pub fn validate_options(meta: &RuleMeta, options: &[Value]) -> Result<(), EngineError> {
    let Some(schema) = &meta.schema else {
        return Ok(());
    };
    if options.len() > schema.len() {
        return Err(EngineError::invalid_options(
            &meta.id,
            format!("expected at most {} option(s), got {}", schema.len(), options.len()),
        ));
    }
    for (index, (option, spec)) in options.iter().zip(schema).enumerate() {
        if let Some(allowed) = spec.get("enum").and_then(|v| v.as_array()) {
            if !allowed.contains(option) {
                return Err(EngineError::invalid_options(
                    &meta.id,
                    format!("option {} must be one of {}", index, Value::Array(allowed.clone())),
                ));
            }
            continue;
        }
        if let Some(expected) = spec.get("type").and_then(|v| v.as_str()) {
            let matches = match expected {
                "string" => option.is_string(),
                "number" => option.is_number(),
                "integer" => option.is_i64() || option.is_u64(),
                "boolean" => option.is_boolean(),
                "object" => option.is_object(),
                "array" => option.is_array(),
                _ => true,
            };
            if !matches {
                return Err(EngineError::invalid_options(
                    &meta.id,
                    format!("option {} must be of type {}", index, expected),
                ));
            }
        }
    }
    Ok(())
}
