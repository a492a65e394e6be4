/*!
# Engine Errors

Failure taxonomy for the lint engine. These are engine-level failures
(broken rules, bad configuration); problems found in the linted source
are reported as `LintMessage`s instead.
*/

use thiserror::Error;

/// Errors raised by the lint engine itself
#[derive(Debug, Error)]
pub enum EngineError {
    /// Config or directive referenced a rule that was never registered
    #[error("Definition for rule '{0}' was not found")]
    UnknownRule(String),

    /// Rule options failed schema validation during activation
    #[error("Invalid options for rule '{rule_id}': {reason}")]
    InvalidRuleOptions { rule_id: String, reason: String },

    /// Rule called report() with an inconsistent descriptor
    #[error("{0}")]
    ReportMisuse(String),

    /// AST fingerprint changed between parse and end of traversal
    #[error("Rule should not modify AST")]
    AstMutated,
}

impl EngineError {
    pub fn invalid_options(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRuleOptions {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }
}
