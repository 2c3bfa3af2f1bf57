//! The error returned by every parser entry point.

use thiserror::Error;

use crate::error::{Diagnostic, ErrorCode};

/// A failed parse of path data, a font shorthand or a glyph outline.
///
/// Holds every diagnostic the parse produced, warnings included, in the
/// order they were found. At least one of them is an error.
#[derive(Debug, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    let Some(first) = diagnostics.iter().find(|d| d.severity().is_error()) else {
        return diagnostics.first().map(ToString::to_string).unwrap_or_default();
    };
    match diagnostics.len() {
        1 => first.to_string(),
        n => format!("{first} (+{} more)", n - 1),
    }
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// All diagnostics, in source order of discovery.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The diagnostics that made the parse fail.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity().is_error())
    }

    /// Whether any diagnostic carries `code`.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code() == Some(code))
    }

    /// Consumes the error, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_from_diagnostic() {
        let err: ParseError = Diagnostic::error("missing font family")
            .with_code(ErrorCode::E200)
            .into();

        assert_eq!(err.diagnostics().len(), 1);
        assert!(err.has_code(ErrorCode::E200));
        assert_eq!(err.to_string(), "error[E200]: missing font family");
    }

    #[test]
    fn test_summary_leads_with_first_error() {
        let err = ParseError::new(vec![
            Diagnostic::warning("unknown glyph operation `q`").with_code(ErrorCode::E202),
            Diagnostic::error("unknown path command `b`").with_code(ErrorCode::E100),
            Diagnostic::error("incomplete parameter group").with_code(ErrorCode::E103),
        ]);

        assert_eq!(
            err.to_string(),
            "error[E100]: unknown path command `b` (+2 more)"
        );
        assert_eq!(err.errors().count(), 2);
        assert!(!err.has_code(ErrorCode::E001));
        assert_eq!(err.into_diagnostics().len(), 3);
    }

    #[test]
    fn test_parse_error_is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(ParseError::from(Diagnostic::error("malformed number")));
        assert_eq!(err.to_string(), "error: malformed number");
        assert!(err.source().is_none());
    }
}
