/*!
# Reference Lexer

Lexical analyzer for the built-in JavaScript-like grammar. Produces a
token stream plus a separate comment list; comments never reach the
grammar but feed the directive processor.
*/

use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::core::position::{LineIndex, Span};

/// Consumes a block comment body up to and including the closing
/// `*/`; an unterminated comment is a lexical error
fn block_comment(lexer: &mut logos::Lexer<'_, RawToken>) -> bool {
    match lexer.remainder().find("*/") {
        Some(end) => {
            lexer.bump(end + 2);
            true
        }
        None => false,
    }
}

/// Raw token classes recognized by logos
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f\u{000B}]+")]
enum RawToken {
    // Keywords
    #[token("var")]
    #[token("let")]
    #[token("const")]
    #[token("function")]
    #[token("if")]
    #[token("else")]
    #[token("while")]
    #[token("do")]
    #[token("for")]
    #[token("in")]
    #[token("switch")]
    #[token("case")]
    #[token("default")]
    #[token("try")]
    #[token("catch")]
    #[token("finally")]
    #[token("return")]
    #[token("throw")]
    #[token("break")]
    #[token("continue")]
    #[token("new")]
    #[token("instanceof")]
    #[token("typeof")]
    #[token("delete")]
    #[token("void")]
    #[token("this")]
    Keyword,

    #[token("true")]
    #[token("false")]
    Boolean,

    #[token("null")]
    Null,

    // Number glued to identifier characters, always a lexical error
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?[a-zA-Z_$]+")]
    InvalidNumber,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    String,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Identifier,

    #[regex(r"//[^\n]*")]
    LineComment,

    // Scanned by callback; a bounded regex trips over nested stars
    #[token("/*", block_comment)]
    BlockComment,

    // Punctuators, longest match wins
    #[token("===")]
    #[token("!==")]
    #[token(">>>=")]
    #[token(">>>")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("++")]
    #[token("--")]
    #[token("<<")]
    #[token(">>")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("{")]
    #[token("}")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token(";")]
    #[token(",")]
    #[token(".")]
    #[token("<")]
    #[token(">")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("!")]
    #[token("~")]
    #[token("?")]
    #[token(":")]
    #[token("=")]
    Punctuator,
}

/// Token categories exposed to rules through `SourceCode::get_tokens`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuator,
    Numeric,
    String,
    Boolean,
    Null,
}

/// Token with source span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

/// Comment with source span; `value` excludes the comment markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub block: bool,
    pub value: String,
    pub span: Span,
}

/// Lexical error with 1-based line and 0-based column
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Tokenizes a text into tokens and comments
pub fn tokenize(text: &str) -> Result<(Vec<Token>, Vec<Comment>), LexError> {
    let line_index = LineIndex::new(text);
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut lexer = RawToken::lexer(text);

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let range = lexer.span();
        let span = Span::new(
            line_index.to_position(range.start),
            line_index.to_position(range.end),
        );
        match result {
            Ok(RawToken::LineComment) => {
                comments.push(Comment {
                    block: false,
                    value: slice[2..].to_string(),
                    span,
                });
            }
            Ok(RawToken::BlockComment) => {
                comments.push(Comment {
                    block: true,
                    value: slice[2..slice.len() - 2].to_string(),
                    span,
                });
            }
            Ok(RawToken::InvalidNumber) => {
                return Err(LexError {
                    message: format!("Invalid or unexpected token '{}'", slice),
                    line: span.start.line,
                    column: span.start.column,
                });
            }
            Ok(raw) => {
                let kind = match raw {
                    RawToken::Keyword => TokenKind::Keyword,
                    RawToken::Boolean => TokenKind::Boolean,
                    RawToken::Null => TokenKind::Null,
                    RawToken::Number => TokenKind::Numeric,
                    RawToken::String => TokenKind::String,
                    RawToken::Identifier => TokenKind::Identifier,
                    RawToken::Punctuator => TokenKind::Punctuator,
                    _ => unreachable!(),
                };
                tokens.push(Token {
                    kind,
                    value: slice.to_string(),
                    span,
                });
            }
            Err(()) => {
                return Err(LexError {
                    message: format!("Invalid or unexpected token '{}'", slice),
                    line: span.start.line,
                    column: span.start.column,
                });
            }
        }
    }

    Ok((tokens, comments))
}
