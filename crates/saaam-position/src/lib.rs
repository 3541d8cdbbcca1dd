//! Byte-offset source position tracking shared by every compiler stage.
mod line_index;
mod span;

pub use line_index::LineIndex;
pub use span::{ByteSpan, SourceLocation};
