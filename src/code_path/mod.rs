/*!
# Code Path Analysis

Control flow graphs over the AST. `CodePathAnalyzer` builds one
`CodePath` per traversable unit (program, function) out of
`CodePathSegment`s while the engine walks the tree, and reports the
lifecycle as `PathEvent`s so rules can subscribe to path and segment
boundaries.
*/

pub mod analyzer;
pub mod path;
pub mod segment;

pub use analyzer::{CodePathAnalyzer, PathEvent};
pub use path::{CodePath, Controller, PathId, TraverseOptions};
pub use segment::{CodePathSegment, SegmentId};

#[cfg(test)]
mod analyzer_integration_test;
