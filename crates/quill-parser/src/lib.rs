//! # Quill Parser
//!
//! Text front ends for Quill:
//!
//! - [`parse_path`] reads SVG style path data into a [`quill_core::path::Path`]
//! - [`parse_font_shorthand`] reads a CSS `font` shorthand into a
//!   [`quill_core::font::FontQuery`]
//! - [`parse_glyph_outline`] reads one Cufón glyph outline into a path
//!
//! Every parser reports problems as [`error::Diagnostic`]s with an
//! [`error::ErrorCode`] and labeled [`Span`]s, collected into an
//! [`error::ParseError`] so one call reports every problem in the input.
//!
//! ## Usage
//!
//! ```
//! # use quill_parser::{parse_path, error::ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let path = parse_path("M 0 0 h 10 v 10 h -10 z")?;
//!     assert_eq!(path.measure().width(), 10.0);
//!     Ok(())
//! }
//! ```

pub mod error;
mod font;
mod lexer;
mod path;
mod span;

pub use font::{parse_font_shorthand, parse_glyph_outline};
pub use path::parse_path;
pub use span::Span;
