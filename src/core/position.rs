/*!
# Source Positions

Positions, spans and offset-to-position conversion for lint targets.
Lines are 1-based and columns 0-based, matching the positions the
parser attaches to AST nodes; lint messages add 1 to the column when
they are rendered.
*/

use serde::{Deserialize, Serialize};

/// Position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (0-based)
    pub column: usize,
    /// Absolute byte offset from start of text
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Position of the first character of a text
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 0,
            offset: 0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Range in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-length span at the start of a text
    pub fn zero() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }

    /// Byte range covered by this span
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start.offset && offset < self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Index of line start offsets for fast offset-to-position conversion
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    /// Byte offset of the start of each line, first entry is always 0
    line_starts: Vec<usize>,
    /// Total text length in bytes
    text_len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            text_len: text.len(),
        }
    }

    /// Converts a byte offset into a position
    pub fn to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text_len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        Position {
            line: line_idx + 1,
            column: offset - self.line_starts[line_idx],
            offset,
        }
    }

    /// Byte range of the given 1-based line, excluding the newline
    pub fn line_range(&self, line: usize) -> Option<std::ops::Range<usize>> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|&next| next.saturating_sub(1))
            .unwrap_or(self.text_len);
        Some(start..end.max(start))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_position_basic() {
        let index = LineIndex::new("ab\ncd\nef");
        assert_eq!(index.to_position(0), Position::new(1, 0, 0));
        assert_eq!(index.to_position(1), Position::new(1, 1, 1));
        assert_eq!(index.to_position(3), Position::new(2, 0, 3));
        assert_eq!(index.to_position(7), Position::new(3, 1, 7));
    }

    #[test]
    fn test_to_position_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.to_position(100), Position::new(1, 2, 2));
    }

    #[test]
    fn test_line_range() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_range(1), Some(0..2));
        assert_eq!(index.line_range(2), Some(3..5));
        assert_eq!(index.line_range(3), Some(6..6));
        assert_eq!(index.line_range(4), None);
        assert_eq!(index.line_range(0), None);
    }

    #[test]
    fn test_span_range() {
        let span = Span::new(Position::new(1, 0, 2), Position::new(1, 3, 5));
        assert_eq!(span.range(), 2..5);
        assert_eq!(span.len(), 3);
        assert!(span.contains_offset(4));
        assert!(!span.contains_offset(5));
    }
}
