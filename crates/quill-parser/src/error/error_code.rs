//! Error codes for parser diagnostics.
//!
//! Codes are grouped by input language:
//! - `E0xx` - Lexer errors shared by every grammar
//! - `E1xx` - Path mini-language errors
//! - `E2xx` - Font shorthand and glyph outline errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unexpected character.
    ///
    /// Only command letters, numbers, whitespace and commas may appear in
    /// path data. The letter `e` is reserved for exponents.
    E001,

    /// Malformed number.
    ///
    /// A sign or decimal point was not followed by any digits.
    E002,

    // =========================================================================
    // Path Errors (E1xx)
    // =========================================================================
    /// Unknown path command.
    ///
    /// The letter is not one of `M L H V C S Q T A Z` in either case.
    E100,

    /// Parameters before any command.
    ///
    /// Path data must start with a command letter.
    E101,

    /// Parameters after close.
    ///
    /// `Z` takes no parameters, so numbers may not follow it until the next
    /// command letter.
    E102,

    /// Incomplete parameter group.
    ///
    /// The number of parameters following a command is not a multiple of the
    /// count the command takes.
    E103,

    // =========================================================================
    // Font Errors (E2xx)
    // =========================================================================
    /// Missing font family.
    ///
    /// A font shorthand ended before naming a family.
    E200,

    /// Malformed glyph outline.
    ///
    /// A glyph operation has the wrong number of coordinates.
    E201,

    /// Unknown glyph operation.
    ///
    /// Outlines use `m`, `r`, `v`, `x` and `e`. Other operations are skipped.
    E202,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unexpected character",
            ErrorCode::E002 => "malformed number",
            ErrorCode::E100 => "unknown path command",
            ErrorCode::E101 => "parameters before any command",
            ErrorCode::E102 => "parameters after close",
            ErrorCode::E103 => "incomplete parameter group",
            ErrorCode::E200 => "missing font family",
            ErrorCode::E201 => "malformed glyph outline",
            ErrorCode::E202 => "unknown glyph operation",
        }
    }
}

impl ErrorCode {
    /// A generic fix for the error, shown when a diagnostic has no help of
    /// its own.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            ErrorCode::E001 => Some("separate numbers and commands with spaces or commas"),
            ErrorCode::E002 => Some("write at least one digit, e.g. `0.5` or `5`"),
            ErrorCode::E100 => Some("path commands are M, L, H, V, C, S, Q, T, A and Z"),
            ErrorCode::E101 => Some("start the path with `M x y`"),
            ErrorCode::E102 => Some("start a new subpath with `M` before more coordinates"),
            ErrorCode::E103 => Some(
                "M, L and T take 2 numbers, H and V take 1, C takes 6, S and Q take 4, A takes 7",
            ),
            ErrorCode::E200 => Some("end the shorthand with a family, e.g. `bold 12px Moderna`"),
            ErrorCode::E201 | ErrorCode::E202 => None,
        }
    }

    /// Whether the code belongs to the path mini-language or its lexer.
    pub fn is_path_code(self) -> bool {
        matches!(
            self,
            ErrorCode::E001
                | ErrorCode::E002
                | ErrorCode::E100
                | ErrorCode::E101
                | ErrorCode::E102
                | ErrorCode::E103
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E103.to_string(), "E103");
        assert_eq!(ErrorCode::E202.to_string(), "E202");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E002.description(), "malformed number");
        assert_eq!(ErrorCode::E101.description(), "parameters before any command");
        assert_eq!(ErrorCode::E200.description(), "missing font family");
    }

    #[test]
    fn test_path_codes_have_hints() {
        for code in [ErrorCode::E100, ErrorCode::E101, ErrorCode::E102, ErrorCode::E103] {
            assert!(code.is_path_code());
            assert!(code.hint().is_some(), "{code}");
        }
        assert!(!ErrorCode::E200.is_path_code());
        assert_eq!(ErrorCode::E202.hint(), None);
    }
}
