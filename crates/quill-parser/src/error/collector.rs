//! Accumulates diagnostics so one pass can report every problem in the input.

use log::warn;

use crate::error::{Diagnostic, ParseError};

/// Collects the diagnostics of one parse.
///
/// ```text
/// let mut collector = DiagnosticCollector::new();
/// collector.emit(
///     Diagnostic::error("unknown path command `b`")
///         .with_code(ErrorCode::E100)
///         .with_label(Span::new(4..5), "not a path command"),
/// );
/// let result = collector.finish(); // Err(ParseError) with one diagnostic
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic; errors mark the collection as failed.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Whether any error has been emitted so far.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finishes collection.
    ///
    /// Returns `Err` with every diagnostic, warnings included, when an error
    /// was emitted. Otherwise the warnings are logged and dropped.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            return Err(ParseError::new(self.diagnostics));
        }
        for diagnostic in &self.diagnostics {
            warn!(diagnostic:%; "Parser warning");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(!collector.has_errors());
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_collector_emit_warning_finish_ok() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("unknown glyph operation `q`"));

        assert!(!collector.has_errors());
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_warnings_with_errors() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("unknown glyph operation `q`"));
        collector.emit(
            Diagnostic::error("parameters before any command")
                .with_code(ErrorCode::E101)
                .with_label(Span::new(0..3), "expected a command letter"),
        );

        assert!(collector.has_errors());
        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[1].code(), Some(ErrorCode::E101));
    }
}
