/*!
# Parser Layer

The engine consumes parsers through the `ParserAdapter` trait: any
adapter that maps its grammar onto the crate's `NodeType` set can feed
the linter. `ReferenceParser` is the built-in adapter for the
JavaScript-like reference grammar.
*/

pub mod ast;
pub mod grammar;
pub mod lexer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ast::Ast;
use lexer::{Comment, Token};

/// Unrecoverable parse failure.
///
/// `line` is 1-based and `column` 0-based; the linter turns this into
/// a single fatal `LintMessage` instead of propagating it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("Parsing error: {message} ({line}:{column})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Everything a parse produces: the tree, the tokens and the comments
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub ast: Ast,
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

/// Contract between the engine and a concrete parser
pub trait ParserAdapter {
    fn parse(&self, text: &str) -> Result<ParseOutput, ParseError>;
}

/// Built-in parser for the reference grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceParser;

impl ReferenceParser {
    pub fn new() -> Self {
        Self
    }
}

impl ParserAdapter for ReferenceParser {
    fn parse(&self, text: &str) -> Result<ParseOutput, ParseError> {
        let (tokens, comments) = lexer::tokenize(text).map_err(|e| ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        })?;
        let ast = grammar::Parser::new(&tokens).parse_program()?;
        Ok(ParseOutput {
            ast,
            tokens,
            comments,
        })
    }
}
