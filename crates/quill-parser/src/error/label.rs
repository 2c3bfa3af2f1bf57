//! Source spans annotated with a message.

use crate::span::Span;

/// A message attached to a region of the parsed text.
///
/// A diagnostic usually carries one primary label pointing at the offending
/// token. Secondary labels point at related tokens, such as the command whose
/// parameter group was left incomplete.
///
/// ```text
/// error[E103]: command `C` takes 6 parameters, found 4
///   |
/// 1 | M 0 0 C 1 2 3 4
///   |       -  ^^^^^^^ incomplete parameter group
///   |       |
///   |       command started here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(8..15), "incomplete parameter group");

        assert_eq!(label.span().start(), 8);
        assert_eq!(label.span().end(), 15);
        assert_eq!(label.message(), "incomplete parameter group");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(Span::new(6..7), "command started here");

        assert_eq!(label.span().len(), 1);
        assert!(label.is_secondary());
    }
}
