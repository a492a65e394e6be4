/*!
# astlint

Pluggable lint engine for a JavaScript-like reference grammar: parse a
text, walk the AST once, and dispatch typed events to configurable
rules that report problems with precise positions.

## Core Features

- **Event-driven rule system** - rules subscribe to node enter/exit
  events and never traverse the tree themselves
- **Code path analysis** - a control flow graph per program and
  function, with segment lifecycle events and a guided graph traversal
- **Scope tracking** - function and catch scopes, variable resolution,
  predefined and configurable globals
- **Inline directives** - `/* global */`, `/* eslint */` and
  `/* eslint-env */` comments configure single files
- **Config loading** - JSON or TOML, with rule order preserved

## Architecture

```text
astlint
├── parser       - lexer, reference grammar, arena AST, adapter trait
├── core         - positions, spans, engine errors
├── source       - SourceCode facade: text, tokens, comments, lookups
├── scope        - scope tree and variable resolution
├── code_path    - control flow graph construction and traversal
├── config       - lint configuration loading
├── rules        - rule trait, registry, options validation
├── diagnostics  - lint messages and severities
└── linter       - the engine: directives, globals, event dispatch
```

## Usage

```rust,ignore
use astlint::{LintConfig, Linter};

let mut linter = Linter::new();
linter.define_rule(std::rc::Rc::new(MyRule));

let config = LintConfig::from_json_str(r#"{"rules": {"my-rule": 2}}"#)?;
let messages = linter.verify("var x = 1;", &config)?;
for message in &messages {
    println!("{message}");
}
```
*/

pub mod code_path;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod linter;
pub mod parser;
pub mod rules;
pub mod scope;
pub mod source;

// Re-export main types for convenience
pub use code_path::{CodePath, CodePathAnalyzer, CodePathSegment, TraverseOptions};
pub use config::LintConfig;
pub use core::{EngineError, LineIndex, Position, Span};
pub use diagnostics::{LintMessage, Severity};
pub use linter::events::{Event, EventKey};
pub use linter::{Linter, Report};
pub use parser::{ParseError, ParserAdapter, ReferenceParser};
pub use rules::{Rule, RuleInit, RuleListeners, RuleMeta, Rules};
pub use scope::{Scope, ScopeManager, ScopeType, Variable};
pub use source::SourceCode;

use anyhow::{Context, Result};
use std::path::Path;

/// Lints a text with an already configured linter
pub fn lint_text(
    linter: &mut Linter,
    text: &str,
    config: &LintConfig,
) -> Result<Vec<LintMessage>> {
    linter
        .verify(text, config)
        .context("Lint verification failed")
}

/// Reads and lints a single file
pub fn lint_file<P: AsRef<Path>>(
    linter: &mut Linter,
    path: P,
    config: &LintConfig,
) -> Result<Vec<LintMessage>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    linter
        .verify(&text, config)
        .with_context(|| format!("Lint verification failed for {}", path.display()))
}
