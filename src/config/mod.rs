/*!
# Lint Configuration

`LintConfig` mirrors the shape rules are configured with: a `rules`
map from rule id to `severity | [severity, ...options]`, declared
`globals` (name to writeable flag) and `env` toggles. The rules map
keeps its key order because rule activation follows it.

Configs load from JSON or TOML; TOML values pass through a JSON
conversion so both formats feed the same structures.
*/

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type JsonMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Rule id to severity or [severity, ...options], in declaration order
    #[serde(default)]
    pub rules: JsonMap,
    /// Global name to writeable flag (or "writeable"/"readonly" string)
    #[serde(default)]
    pub globals: JsonMap,
    /// Environment name to enabled flag
    #[serde(default)]
    pub env: JsonMap,
}

impl LintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Failed to parse JSON lint config")
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let value: toml::Value = toml::from_str(text).context("Failed to parse TOML lint config")?;
        let json = serde_json::to_value(value).context("Failed to convert TOML config")?;
        serde_json::from_value(json).context("Failed to interpret TOML lint config")
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Adds or replaces a rule entry, keeping existing position
    pub fn set_rule(&mut self, name: &str, value: Value) {
        self.rules.insert(name.to_string(), value);
    }

    /// True when the globals table marks `name` writeable
    pub fn global_writeable(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::String(s) => s == "writeable" || s == "writable" || s == "true",
            _ => false,
        }
    }
}

/// Severity level of a rule entry: plain level or first array element
pub fn rule_severity(value: &Value) -> u64 {
    let level = match value {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };
    match level {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => match s.as_str() {
            "warn" | "warning" => 1,
            "error" => 2,
            _ => 0,
        },
        _ => 0,
    }
}

/// Options of a rule entry: array elements after the severity
pub fn rule_options(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.iter().skip(1).cloned().collect(),
        _ => Vec::new(),
    }
}
