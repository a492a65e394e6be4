/*!
# Lint Messages

Problem reports produced by rules and by the parser. A message carries
the reporting rule's id (absent for fatal parse errors), a severity,
1-based line and column, and optionally the source-text slice of the
reported node.
*/

use serde::{Deserialize, Serialize};

use crate::parser::ast::NodeType;

/// Severity of a lint message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Rule is disabled, no messages are produced
    Off,
    Warning,
    Error,
}

impl Severity {
    /// Maps a numeric config level (0, 1, 2) to a severity
    pub fn from_level(level: u64) -> Self {
        match level {
            0 => Severity::Off,
            1 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn as_level(&self) -> u64 {
        match self {
            Severity::Off => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Severity::Off)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Off => "off",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Single problem found in a linted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintMessage {
    /// Id of the reporting rule, `None` for fatal parse errors
    pub rule_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Source-text slice of the reported node or offending line
    pub source: Option<String>,
    /// Type of the reported node, if the report carried one
    pub node_type: Option<NodeType>,
    /// True for unrecoverable parse errors
    pub fatal: bool,
}

impl LintMessage {
    /// Builds the single fatal message produced when parsing fails
    pub fn fatal(message: String, line: usize, column: usize, source: Option<String>) -> Self {
        Self {
            rule_id: None,
            severity: Severity::Error,
            message,
            line,
            column,
            source,
            node_type: None,
            fatal: true,
        }
    }
}

impl std::fmt::Display for LintMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {} {}",
            self.line,
            self.column,
            self.severity,
            self.message
        )?;
        if let Some(ref rule_id) = self.rule_id {
            write!(f, " ({})", rule_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity_from_level() {
        assert_eq!(Severity::from_level(0), Severity::Off);
        assert_eq!(Severity::from_level(1), Severity::Warning);
        assert_eq!(Severity::from_level(2), Severity::Error);
        assert_eq!(Severity::from_level(9), Severity::Error);
    }

    #[test]
    fn test_fatal_message() {
        let msg = LintMessage::fatal("Parsing error: boom".to_string(), 1, 1, None);
        assert!(msg.fatal);
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.rule_id, None);
    }

    #[test]
    fn test_message_display() {
        let msg = LintMessage {
            rule_id: Some("no-eval".to_string()),
            severity: Severity::Error,
            message: "eval is evil".to_string(),
            line: 3,
            column: 5,
            source: None,
            node_type: None,
            fatal: false,
        };
        assert_eq!(msg.to_string(), "3:5 error eval is evil (no-eval)");
    }
}
