//! Diagnostics produced by the parsers.
//!
//! Every parser reports problems as [`Diagnostic`]s: a severity, an optional
//! [`ErrorCode`], a message, labeled [`Span`](crate::Span)s into the input and
//! optional help. A failed parse returns all of them at once inside a
//! [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use quill_parser::error::{Diagnostic, ErrorCode};
//! # use quill_parser::Span;
//! let diag = Diagnostic::error("numbers after `Z`")
//!     .with_code(ErrorCode::E102)
//!     .with_label(Span::new(12..15), "unexpected parameters")
//!     .with_help("start a new subpath with `M` first");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
