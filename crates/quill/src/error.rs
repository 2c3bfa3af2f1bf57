//! Error types for Quill operations.
//!
//! Most problems in a scene are recoverable and are logged instead of
//! returned: malformed path data draws nothing, bad colors paint nothing and
//! operations on unknown nodes are ignored. [`QuillError`] covers the rest.

use std::io;

use thiserror::Error;

use quill_core::font::FontError;
use quill_parser::error::ParseError;

/// The main error type for Quill operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the parsed source next to the diagnostics so
/// callers can render them with source spans.
#[derive(Debug, Error)]
pub enum QuillError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("The specified font has not been found: {family} ({weight}, {style})")]
    FontNotFound {
        family: String,
        weight: String,
        style: String,
    },

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scene error: {0}")]
    Scene(String),
}

impl QuillError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
