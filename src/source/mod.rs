/*!
# Source Code Bundle

`SourceCode` binds together everything one parse produced: the raw
text, the arena AST, tokens, comments and the line index. Rule
contexts hand out borrows of this bundle; it never changes during a
verify run.
*/

pub mod token_index;

use crate::core::position::LineIndex;
use crate::parser::ast::{Ast, AstNode, NodeId};
use crate::parser::lexer::{Comment, Token};
use token_index::TokenIndex;

#[derive(Debug, Clone)]
pub struct SourceCode {
    text: String,
    ast: Ast,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    line_index: LineIndex,
    token_index: TokenIndex,
}

impl SourceCode {
    pub fn new(text: String, ast: Ast, tokens: Vec<Token>, comments: Vec<Comment>) -> Self {
        let line_index = LineIndex::new(&text);
        let token_index = TokenIndex::new(&tokens);
        Self {
            text,
            ast,
            tokens,
            comments,
            line_index,
            token_index,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        self.ast.node(id)
    }

    /// Source slice of a node, widened by `before`/`after` characters;
    /// with no node, the whole text
    pub fn get_source(&self, node: Option<&AstNode>, before: usize, after: usize) -> &str {
        match node {
            Some(node) => {
                let range = node.span.range();
                // Widening counts characters, not bytes
                let start = self.text[..range.start]
                    .char_indices()
                    .rev()
                    .take(before)
                    .last()
                    .map_or(range.start, |(i, _)| i);
                let end = self.text[range.end..]
                    .char_indices()
                    .nth(after)
                    .map_or(self.text.len(), |(i, _)| range.end + i);
                &self.text[start..end]
            }
            None => &self.text,
        }
    }

    /// Tokens covered by a node's span, widened by `before`/`after`
    /// neighbor tokens
    pub fn get_tokens(&self, node: &AstNode, before: usize, after: usize) -> Vec<&Token> {
        let range = node.span.range();
        let indices = self
            .token_index
            .range_with_neighbors(range.start, range.end, before, after);
        self.tokens[indices].iter().collect()
    }

    /// Token whose span starts exactly at `offset`
    pub fn token_by_range_start(&self, offset: usize) -> Option<&Token> {
        self.token_index
            .by_range_start(offset)
            .map(|i| &self.tokens[i])
    }

    /// Text of the given 1-based line, used by fatal parse messages
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.line_index.line_range(line).map(|r| &self.text[r])
    }
}
