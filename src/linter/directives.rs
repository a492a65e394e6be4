/*!
# Directive Comments

Block comments can configure the linted file inline:

- `/* global name1, name2:true */` declares globals, with an optional
  writeable flag per name
- `/* eslint rule: 2, other: [1, "opt"] */` overrides rule settings
- `/* eslint-env node, browser */` enables environments
- `/* jshint node:true */` and `/* jslint */` boolean configs are
  honored as environment toggles

Only block comments are directives; line comments never are.
*/

use serde_json::Value;

use crate::parser::lexer::Comment;

/// Inline configuration gathered from one text's comments
#[derive(Debug, Default, PartialEq)]
pub struct DirectiveOutcome {
    /// Declared global names with their writeable flag
    pub globals: Vec<(String, bool)>,
    /// Environments enabled inline
    pub envs: Vec<String>,
    /// Rule overrides in source order, applied after the config's rules
    pub rule_overrides: Vec<(String, Value)>,
}

/// Scans block comments for directive prefixes
pub fn gather(comments: &[Comment]) -> DirectiveOutcome {
    let mut outcome = DirectiveOutcome::default();
    for comment in comments.iter().filter(|c| c.block) {
        let text = comment.value.trim();
        let Some((word, rest)) = split_directive(text) else {
            continue;
        };
        match word {
            "global" | "globals" => {
                for (name, value) in parse_pairs(rest) {
                    let writeable = matches!(value.as_deref(), Some("true") | Some("writeable") | Some("writable"));
                    outcome.globals.push((name, writeable));
                }
            }
            "eslint" => {
                for (name, value) in parse_pairs(rest) {
                    let raw = value.unwrap_or_else(|| "0".to_string());
                    // Severity words come through as bare strings
                    let parsed = serde_json::from_str(&raw)
                        .unwrap_or_else(|_| Value::String(raw));
                    outcome.rule_overrides.push((name, parsed));
                }
            }
            "eslint-env" => {
                for (name, _) in parse_pairs(rest) {
                    outcome.envs.push(name);
                }
            }
            "jshint" | "jslint" => {
                for (name, value) in parse_pairs(rest) {
                    if value.as_deref() == Some("true") {
                        outcome.envs.push(name);
                    }
                }
            }
            _ => {}
        }
    }
    outcome
}

/// Splits a directive comment into its leading word and the rest
fn split_directive(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    let end = text
        .find(|c: char| c.is_whitespace())
        .unwrap_or(text.len());
    Some((&text[..end], text[end..].trim_start()))
}

/// Parses `name, name: value, name: [1, "x"]` lists. Commas inside
/// brackets, braces or quotes do not split entries.
fn parse_pairs(text: &str) -> Vec<(String, Option<String>)> {
    let mut pairs = Vec::new();
    for entry in split_top_level(text) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.find(':') {
            Some(at) => {
                let name = entry[..at].trim();
                let value = entry[at + 1..].trim();
                if !name.is_empty() {
                    pairs.push((name.to_string(), Some(value.to_string())));
                }
            }
            None => pairs.push((entry.to_string(), None)),
        }
    }
    pairs
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '{' | '(' => depth += 1,
                ']' | '}' | ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&text[start..index]);
                    start = index + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}
