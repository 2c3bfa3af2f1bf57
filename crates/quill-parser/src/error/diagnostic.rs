//! The core diagnostic type.

use thiserror::Error;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A single error or warning with its source locations.
///
/// # Example
///
/// ```
/// # use quill_parser::error::{Diagnostic, ErrorCode};
/// # use quill_parser::Span;
/// let diag = Diagnostic::error("command `C` takes 6 parameters, found 4")
///     .with_code(ErrorCode::E103)
///     .with_label(Span::new(8..15), "incomplete parameter group")
///     .with_secondary_label(Span::new(6..7), "command started here")
///     .with_help("add the missing coordinates");
///
/// assert_eq!(diag.to_string(), "error[E103]: command `C` takes 6 parameters, found 4");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{severity}{}: {message}", bracketed(.code))]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The first primary label, if any.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|label| label.is_primary())
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The explicit help, or else the generic hint of the error code.
    pub fn help_or_hint(&self) -> Option<&str> {
        self.help().or_else(|| self.code.and_then(ErrorCode::hint))
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

fn bracketed(code: &Option<ErrorCode>) -> String {
    code.map(|code| format!("[{code}]")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "unexpected character `#`");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "unexpected character `#`");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.primary_label().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_labels() {
        let diag = Diagnostic::error("incomplete parameter group")
            .with_secondary_label(Span::new(6..7), "command started here")
            .with_label(Span::new(8..15), "found 4 of 6");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_secondary());
        let primary = diag.primary_label().unwrap();
        assert_eq!(primary.message(), "found 4 of 6");
        assert_eq!(primary.span().start(), 8);
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("unknown path command `b`").with_code(ErrorCode::E100);

        assert_eq!(diag.to_string(), "error[E100]: unknown path command `b`");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("unknown glyph operation `q`").with_help("it is skipped");

        assert_eq!(diag.to_string(), "warning: unknown glyph operation `q`");
        assert_eq!(diag.help(), Some("it is skipped"));
    }

    #[test]
    fn test_help_falls_back_to_code_hint() {
        let diag = Diagnostic::error("numbers after `Z`").with_code(ErrorCode::E102);
        assert_eq!(diag.help(), None);
        assert_eq!(diag.help_or_hint(), ErrorCode::E102.hint());

        let diag = diag.with_help("start a new subpath with `M` first");
        assert_eq!(diag.help_or_hint(), Some("start a new subpath with `M` first"));
        assert_eq!(Diagnostic::error("bare").help_or_hint(), None);
    }
}
