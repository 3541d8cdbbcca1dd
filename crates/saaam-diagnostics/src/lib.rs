//! The diagnostics sink shared by every stage of the SAAAM compiler.
//!
//! An ordered, append-only list of [`Diagnostic`]s. The sink never aborts a
//! compile on its own; every stage keeps going and lets the facade decide
//! what to do once [`DiagnosticSink::has_errors`] is known.

use saaam_diagnostics_codes::DiagnosticCode;
pub use saaam_diagnostics_codes::DiagnosticSeverity;
use saaam_position::LineIndex;

/// A single compiler diagnostic bound to a byte position in the source.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    pub position: usize,
}

impl Diagnostic {
    /// Render this diagnostic with 1-based line/column recovered from `text`.
    ///
    /// Line/column are never stored on the diagnostic itself (§3: "line/column
    /// may be recovered on demand by scanning newlines"); this is that scan.
    pub fn render(&self, text: &str) -> String {
        let (line, col) = LineIndex::new(text).line_col(self.position);
        format!("{}:{}: {} [{}] {}", line, col, self.severity, self.code, self.message)
    }
}

/// Ordered, append-only collector for [`Diagnostic`]s.
///
/// Shared by reference across the lexer, parser, and analyser; the emitter
/// only reads `has_errors` to decide whether it should run at all.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at `position`.
    pub fn error(&mut self, code: DiagnosticCode, message: impl Into<String>, position: usize) {
        self.push(DiagnosticSeverity::Error, code, message, position);
    }

    /// Record a warning at `position`.
    pub fn warn(&mut self, code: DiagnosticCode, message: impl Into<String>, position: usize) {
        self.push(DiagnosticSeverity::Warning, code, message, position);
    }

    fn push(
        &mut self,
        severity: DiagnosticSeverity,
        code: DiagnosticCode,
        message: impl Into<String>,
        position: usize,
    ) {
        self.diagnostics.push(Diagnostic { severity, code, message: message.into(), position });
    }

    /// True iff at least one `Error`-severity diagnostic has been recorded.
    ///
    /// A compilation is "successful" iff this is false and the AST root is
    /// non-null.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// All diagnostics in insertion order, unfiltered.
    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_all(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_no_errors() {
        let mut sink = DiagnosticSink::new();
        sink.warn(DiagnosticCode::UnusedDeclaration, "declared but never used", 3);
        assert!(!sink.has_errors());
        sink.error(DiagnosticCode::UnexpectedEof, "unexpected end of input", 10);
        assert!(sink.has_errors());
    }

    #[test]
    fn render_recovers_line_and_column() {
        let mut sink = DiagnosticSink::new();
        sink.error(DiagnosticCode::UnexpectedCharacter, "unexpected character '@'", 4);
        let rendered = sink.all()[0].render("ab\n@cd");
        assert!(rendered.starts_with("2:1:"));
    }
}
