/*!
# Rule Context

The per-listener view a rule gets of the engine: report problems,
inspect scopes and ancestors, slice source text and tokens. Reports
go through a translation step that resolves message ids against the
rule's catalog and interpolates `{{placeholder}}` data.
*/

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::core::errors::EngineError;
use crate::diagnostics::{LintMessage, Severity};
use crate::parser::ast::{AstNode, NodeId};
use crate::parser::lexer::Token;
use crate::scope::{Scope, ScopeManager};
use crate::source::SourceCode;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder regex"));

/// Report descriptor built by rules and translated by the context
#[derive(Debug, Default)]
pub struct Report {
    node: Option<NodeId>,
    loc: Option<(usize, usize)>,
    message: Option<String>,
    message_id: Option<String>,
    data: Vec<(String, String)>,
}

impl Report {
    /// Anchors the report at a node
    pub fn on(node: NodeId) -> Self {
        Self {
            node: Some(node),
            ..Default::default()
        }
    }

    /// Anchors the report at an explicit 1-based line and column
    pub fn at(line: usize, column: usize) -> Self {
        Self {
            loc: Some((line, column)),
            ..Default::default()
        }
    }

    /// Literal message text, mutually exclusive with `message_id`
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Message id resolved against the rule's catalog
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Adds a `{{key}}` interpolation value
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }
}

/// Engine facade handed to rule listeners
pub struct RuleContext<'s, 'r> {
    source: &'s SourceCode,
    scopes: &'r mut ScopeManager,
    messages: &'r mut Vec<LintMessage>,
    rule_id: &'r str,
    severity: Severity,
    templates: &'r HashMap<String, String>,
    options: &'r [Value],
    current_node: NodeId,
}

impl<'s, 'r> RuleContext<'s, 'r> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        source: &'s SourceCode,
        scopes: &'r mut ScopeManager,
        messages: &'r mut Vec<LintMessage>,
        rule_id: &'r str,
        severity: Severity,
        templates: &'r HashMap<String, String>,
        options: &'r [Value],
        current_node: NodeId,
    ) -> Self {
        Self {
            source,
            scopes,
            messages,
            rule_id,
            severity,
            templates,
            options,
            current_node,
        }
    }

    pub fn rule_id(&self) -> &str {
        self.rule_id
    }

    /// Positional options from the config entry, severity stripped
    pub fn options(&self) -> &[Value] {
        self.options
    }

    pub fn source_code(&self) -> &'s SourceCode {
        self.source
    }

    /// Source-text slice of a node, widened by `before`/`after` bytes
    pub fn get_source(&self, node: Option<&AstNode>, before: usize, after: usize) -> &'s str {
        self.source.get_source(node, before, after)
    }

    /// Tokens of a node, widened by `before`/`after` neighbor tokens
    pub fn get_tokens(&self, node: &AstNode, before: usize, after: usize) -> Vec<&'s Token> {
        self.source.get_tokens(node, before, after)
    }

    /// Ancestors of the current node, root first
    pub fn get_ancestors(&self) -> Vec<NodeId> {
        self.source.ast().ancestors(self.current_node)
    }

    /// Innermost scope enclosing the current node
    pub fn get_scope(&self) -> &Scope {
        let id = self.scopes.innermost_scope(self.source.ast(), self.current_node);
        self.scopes.scope(id)
    }

    /// Marks `name` used from the current position; false when the
    /// name does not resolve to any variable
    pub fn mark_variable_as_used(&mut self, name: &str) -> bool {
        let from = self.scopes.innermost_scope(self.source.ast(), self.current_node);
        self.scopes.mark_used(from, name)
    }

    /// Translates and records a report descriptor.
    ///
    /// Misuse (no anchor, no message, unknown message id) is an
    /// engine error, not a lint message.
    pub fn report(&mut self, report: Report) -> Result<(), EngineError> {
        let template = match (&report.message_id, &report.message) {
            (Some(_), Some(_)) => {
                return Err(EngineError::ReportMisuse(
                    "context.report() called with a messageId and a message.".to_string(),
                ));
            }
            (Some(id), None) => match self.templates.get(id) {
                Some(t) => t.clone(),
                None => {
                    return Err(EngineError::ReportMisuse(format!(
                        "context.report() called with a messageId of '{}' which is not present in the 'messages' config",
                        id
                    )));
                }
            },
            (None, Some(message)) => {
                if !report.data.is_empty() {
                    return Err(EngineError::ReportMisuse(
                        "context.report() called with data without a messageId.".to_string(),
                    ));
                }
                message.clone()
            }
            (None, None) => {
                return Err(EngineError::ReportMisuse(
                    "Missing `message`.".to_string(),
                ));
            }
        };

        let data: HashMap<&str, &str> = report
            .data
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let message = PLACEHOLDER
            .replace_all(&template, |caps: &regex::Captures<'_>| {
                match data.get(&caps[1]) {
                    Some(value) => (*value).to_string(),
                    // Unknown placeholders stay verbatim
                    None => caps[0].to_string(),
                }
            })
            .into_owned();

        let (line, column, source, node_type) = match (report.node, report.loc) {
            (Some(node_id), _) => {
                let node = self.source.node(node_id);
                (
                    node.span.start.line,
                    node.span.start.column + 1,
                    Some(self.source.get_source(Some(node), 0, 0).to_string()),
                    Some(node.node_type),
                )
            }
            (None, Some((line, column))) => {
                (line, column, self.source.line_text(line).map(String::from), None)
            }
            (None, None) => {
                return Err(EngineError::ReportMisuse(
                    "Node must be provided when reporting error if location is not provided"
                        .to_string(),
                ));
            }
        };

        self.messages.push(LintMessage {
            rule_id: Some(self.rule_id.to_string()),
            severity: self.severity,
            message,
            line,
            column,
            source,
            node_type,
            fatal: false,
        });
        Ok(())
    }
}
