//! Line/column recovery from byte offsets.
//!
//! Diagnostics carry a byte offset only; line and column are recovered on
//! demand by scanning the source for newlines, never stored on the token or
//! AST node itself.

/// Maps byte offsets in a source string back to 1-based line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Scan `text` once, recording the byte offset of every line start.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts, len: text.len() }
    }

    /// Convert a byte offset into a 1-based `(line, column)` pair.
    ///
    /// Offsets past the end of the source clamp to the last position.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l.saturating_sub(1),
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col as u32 + 1)
    }
}
