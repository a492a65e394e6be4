/*!
# Token Index

Offset-based lookup over the token list. Tokens are stored in source
order, so range queries reduce to binary searches over start offsets.
*/

use crate::parser::lexer::Token;

#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    /// Start offset of each token, in token order
    starts: Vec<usize>,
}

impl TokenIndex {
    pub fn new(tokens: &[Token]) -> Self {
        Self {
            starts: tokens.iter().map(|t| t.span.start.offset).collect(),
        }
    }

    /// Index of the token whose span starts exactly at `offset`
    pub fn by_range_start(&self, offset: usize) -> Option<usize> {
        self.starts.binary_search(&offset).ok()
    }

    /// Index of the first token starting at or after `offset`
    pub fn first_at_or_after(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s < offset)
    }

    /// Indices of tokens fully inside `start..end`, widened by
    /// `before` and `after` neighbors
    pub fn range_with_neighbors(
        &self,
        start: usize,
        end: usize,
        before: usize,
        after: usize,
    ) -> std::ops::Range<usize> {
        let lo = self.first_at_or_after(start);
        let hi = self.starts.partition_point(|&s| s < end);
        lo.saturating_sub(before)..(hi + after).min(self.starts.len())
    }
}
