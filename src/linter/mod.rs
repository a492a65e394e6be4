/*!
# Lint Engine

`Linter` wires the pipeline together: parse the text, gather directive
comments, build scopes and predefined globals, activate the configured
rules, then walk the AST once dispatching typed events (node enter and
exit, code path and segment lifecycle) to the rule listeners.

The engine is stateful the way a single verification needs it to be:
after `verify` the parsed `SourceCode` and the `ScopeManager` stay
available for inspection until the next call.
*/

pub mod context;
pub mod directives;
pub mod events;
pub mod globals;
pub mod traverser;

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::code_path::{CodePathAnalyzer, PathEvent};
use crate::config::{rule_options, rule_severity, LintConfig};
use crate::core::errors::EngineError;
use crate::diagnostics::{LintMessage, Severity};
use crate::parser::{ParserAdapter, ReferenceParser};
use crate::rules::{validate_options, ListenerFn, RuleInit, Rules};
use crate::scope::ScopeManager;
use crate::source::SourceCode;

use context::RuleContext;
use events::{Event, EventKey};
use globals::Environments;

pub use context::Report;

/// One rule switched on for the current verification
struct ActivatedRule {
    id: String,
    severity: Severity,
    templates: HashMap<String, String>,
    options: Vec<Value>,
    listeners: Vec<(EventKey, ListenerFn)>,
}

pub struct Linter {
    rules: Rules,
    environments: Environments,
    parser: Box<dyn ParserAdapter>,
    source: Option<SourceCode>,
    scopes: Option<ScopeManager>,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter {
    pub fn new() -> Self {
        Self {
            rules: Rules::new(),
            environments: Environments::new(),
            parser: Box::new(ReferenceParser::new()),
            source: None,
            scopes: None,
        }
    }

    /// Swaps the parser adapter, e.g. for a test double
    pub fn with_parser(parser: Box<dyn ParserAdapter>) -> Self {
        Self {
            parser,
            ..Self::new()
        }
    }

    pub fn define_rule(&mut self, rule: std::rc::Rc<dyn crate::rules::Rule>) {
        self.rules.define(rule);
    }

    pub fn define_rules(&mut self, rules: impl IntoIterator<Item = std::rc::Rc<dyn crate::rules::Rule>>) {
        for rule in rules {
            self.rules.define(rule);
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Parsed source of the last `verify`, until `reset`
    pub fn source_code(&self) -> Option<&SourceCode> {
        self.source.as_ref()
    }

    pub fn scope_manager(&self) -> Option<&ScopeManager> {
        self.scopes.as_ref()
    }

    /// Drops the state kept from the previous verification
    pub fn reset(&mut self) {
        self.source = None;
        self.scopes = None;
    }

    /// Lints `text` under `config` and returns the messages in
    /// emission order.
    ///
    /// Parse failures come back as a single fatal message; engine
    /// misuse (unknown rule ids, invalid options, bad reports, a rule
    /// mutating the AST) is an error.
    pub fn verify(
        &mut self,
        text: &str,
        config: &LintConfig,
    ) -> Result<Vec<LintMessage>, EngineError> {
        self.reset();
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let output = match self.parser.parse(text) {
            Ok(output) => output,
            Err(err) => {
                let source_line = text.lines().nth(err.line.saturating_sub(1));
                return Ok(vec![LintMessage::fatal(
                    format!("Parsing error: {}", err.message),
                    err.line,
                    err.column + 1,
                    source_line.map(String::from),
                )]);
            }
        };

        let directives = directives::gather(&output.comments);
        let mut scopes = ScopeManager::analyze(&output.ast);
        let source = SourceCode::new(text.to_string(), output.ast, output.tokens, output.comments);

        // Predefined globals, then config globals, then inline ones
        let mut enabled_envs: Vec<String> = config
            .env
            .iter()
            .filter(|(_, v)| v.as_bool().unwrap_or(false))
            .map(|(k, _)| k.clone())
            .collect();
        enabled_envs.extend(directives.envs.iter().cloned());
        self.environments.apply(&mut scopes, &enabled_envs);
        for (name, value) in &config.globals {
            scopes.define_global(name, LintConfig::global_writeable(value));
        }
        for (name, writeable) in &directives.globals {
            scopes.define_global(name, *writeable);
        }

        let mut activated = self.activate_rules(config, directives.rule_overrides)?;
        debug!(rules = activated.len(), "rules activated");

        let fingerprint = source.ast().fingerprint();
        let mut messages = Vec::new();
        let mut analyzer = CodePathAnalyzer::new();
        let ast = source.ast();

        for step in traverser::steps(ast, ast.root()) {
            if step.enter {
                let path_events = analyzer.enter(ast, step.node);
                dispatch_path_events(
                    &analyzer,
                    &path_events,
                    &mut activated,
                    &source,
                    &mut scopes,
                    &mut messages,
                )?;
                let node = source.node(step.node);
                let event = Event::Node {
                    node,
                    id: step.node,
                    exit: false,
                };
                dispatch(
                    &mut activated,
                    EventKey::Enter(node.node_type),
                    &event,
                    &source,
                    &mut scopes,
                    &mut messages,
                )?;
            } else {
                let (pre, post) = analyzer.leave(ast, step.node);
                dispatch_path_events(
                    &analyzer,
                    &pre,
                    &mut activated,
                    &source,
                    &mut scopes,
                    &mut messages,
                )?;
                let node = source.node(step.node);
                let event = Event::Node {
                    node,
                    id: step.node,
                    exit: true,
                };
                dispatch(
                    &mut activated,
                    EventKey::Exit(node.node_type),
                    &event,
                    &source,
                    &mut scopes,
                    &mut messages,
                )?;
                dispatch_path_events(
                    &analyzer,
                    &post,
                    &mut activated,
                    &source,
                    &mut scopes,
                    &mut messages,
                )?;
            }
        }

        if source.ast().fingerprint() != fingerprint {
            return Err(EngineError::AstMutated);
        }

        debug!(messages = messages.len(), "verification finished");
        self.source = Some(source);
        self.scopes = Some(scopes);
        Ok(messages)
    }

    /// Resolves the effective rule list (config order, inline
    /// overrides applied in place or appended) and activates it
    fn activate_rules(
        &self,
        config: &LintConfig,
        overrides: Vec<(String, Value)>,
    ) -> Result<Vec<ActivatedRule>, EngineError> {
        let mut effective: Vec<(String, Value)> = config
            .rules
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, value) in overrides {
            match effective.iter_mut().find(|(n, _)| n == &name) {
                Some(slot) => slot.1 = value,
                None => effective.push((name, value)),
            }
        }

        let mut activated = Vec::new();
        for (name, value) in effective {
            let severity = Severity::from_level(rule_severity(&value));
            if !severity.is_enabled() {
                continue;
            }
            let rule = self
                .rules
                .get(&name)
                .ok_or_else(|| EngineError::UnknownRule(name.clone()))?;
            let meta = rule.meta();
            let options = rule_options(&value);
            validate_options(&meta, &options)?;
            let listeners = rule.create(&RuleInit { options: &options });
            activated.push(ActivatedRule {
                id: name,
                severity,
                templates: meta.messages,
                options,
                listeners: listeners.entries,
            });
        }
        Ok(activated)
    }
}

/// Fires every listener subscribed to `key`, in activation order
fn dispatch(
    activated: &mut [ActivatedRule],
    key: EventKey,
    event: &Event<'_>,
    source: &SourceCode,
    scopes: &mut ScopeManager,
    messages: &mut Vec<LintMessage>,
) -> Result<(), EngineError> {
    for rule in activated.iter_mut() {
        let ActivatedRule {
            id,
            severity,
            templates,
            options,
            listeners,
        } = rule;
        for (entry_key, listener) in listeners.iter_mut() {
            if *entry_key == key {
                let mut ctx = RuleContext::new(
                    source,
                    scopes,
                    messages,
                    id,
                    *severity,
                    templates,
                    options,
                    event.node_id(),
                );
                listener(&mut ctx, event)?;
            }
        }
    }
    Ok(())
}

fn dispatch_path_events(
    analyzer: &CodePathAnalyzer,
    path_events: &[PathEvent],
    activated: &mut [ActivatedRule],
    source: &SourceCode,
    scopes: &mut ScopeManager,
    messages: &mut Vec<LintMessage>,
) -> Result<(), EngineError> {
    for &path_event in path_events {
        let (key, event) = match path_event {
            PathEvent::Start { path, node } => (
                EventKey::CodePathStart,
                Event::CodePath {
                    path: analyzer.path(path),
                    node: source.node(node),
                    id: node,
                    start: true,
                },
            ),
            PathEvent::End { path, node } => (
                EventKey::CodePathEnd,
                Event::CodePath {
                    path: analyzer.path(path),
                    node: source.node(node),
                    id: node,
                    start: false,
                },
            ),
            PathEvent::SegmentStart { path, segment, node } => (
                EventKey::SegmentStart,
                Event::Segment {
                    segment: analyzer.path(path).segment(segment),
                    path: analyzer.path(path),
                    node: source.node(node),
                    id: node,
                    start: true,
                },
            ),
            PathEvent::SegmentEnd { path, segment, node } => (
                EventKey::SegmentEnd,
                Event::Segment {
                    segment: analyzer.path(path).segment(segment),
                    path: analyzer.path(path),
                    node: source.node(node),
                    id: node,
                    start: false,
                },
            ),
        };
        dispatch(activated, key, &event, source, scopes, messages)?;
    }
    Ok(())
}

#[cfg(test)]
mod verify_integration_test;
