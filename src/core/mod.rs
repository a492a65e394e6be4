/*!
# Core Types

Shared primitives for the lint engine: source positions, spans,
line indexing and the engine error taxonomy.
*/

pub mod errors;
pub mod position;

pub use errors::EngineError;
pub use position::{LineIndex, Position, Span};
