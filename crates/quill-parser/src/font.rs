//! Font shorthands and Cufón glyph outlines.
//!
//! [`parse_font_shorthand`] reads the subset of the CSS `font` shorthand that
//! selects a glyph table: any number of `normal`, `bold` and `italic`
//! keywords, an optional size with unit and line height, and the family,
//! optionally quoted.
//!
//! [`parse_glyph_outline`] turns the compact outline of one glyph into a
//! [`Path`]. Outlines are comma separated coordinates introduced by one letter
//! operations: `m` moves to an absolute point, `r` draws a relative line, `v`
//! a relative cubic, `x` closes and `e` ends the outline. Coordinates before
//! the first letter belong to an implicit `m`.

use log::trace;
use quill_core::{font::FontQuery, geometry::Point, path::Path};
use winnow::{
    Parser as _,
    ascii::{Caseless, digit1, multispace0, multispace1},
    combinator::{alt, opt, repeat, terminated},
    error::{ContextError, ModalResult},
    stream::{LocatingSlice, Location},
    token::{literal, take_till, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lexer::{self, PositionedToken, Token},
    span::Span,
};

type Input<'a> = LocatingSlice<&'a str>;

/// The pieces of a shorthand before interpretation.
struct Shorthand<'a> {
    keywords: Vec<&'a str>,
    size: Option<f64>,
    family: &'a str,
    family_start: usize,
}

fn keyword<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    alt((
        literal(Caseless("normal")),
        literal(Caseless("bold")),
        literal(Caseless("italic")),
    ))
    .parse_next(input)
}

/// `12px`, `1.5em/2 `: a size, its unit, an optional line height, and the
/// whitespace that must follow.
fn size(input: &mut Input<'_>) -> ModalResult<f64> {
    let value = (digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)?;
    take_while(0.., |c: char| "ptexm%".contains(c.to_ascii_lowercase())).parse_next(input)?;
    opt((multispace0, '/', take_till(0.., char::is_whitespace))).parse_next(input)?;
    multispace1.parse_next(input)?;
    Ok(value)
}

fn shorthand<'a>(input: &mut Input<'a>) -> ModalResult<Shorthand<'a>> {
    multispace0.parse_next(input)?;
    let keywords: Vec<&str> = repeat(0.., terminated(keyword, multispace1)).parse_next(input)?;
    let size = opt(size).parse_next(input)?;
    multispace0.parse_next(input)?;
    opt('"').parse_next(input)?;
    let family_start = input.current_token_start();
    let family = take_while(0.., |c: char| c != '"').parse_next(input)?;
    Ok(Shorthand {
        keywords,
        size,
        family,
        family_start,
    })
}

/// Parse a CSS font shorthand such as `bold 12px/1.2 "Moderna"`.
///
/// Keywords are matched case-insensitively. Text that does not fit the size
/// grammar is read as part of the family, so `12px` alone names a family.
///
/// # Errors
///
/// Returns [`ErrorCode::E200`] when no family is named.
///
/// # Examples
///
/// ```
/// # use quill_parser::parse_font_shorthand;
/// let query = parse_font_shorthand("italic bold 12.5px Moderna").unwrap();
/// assert_eq!(query.family, "Moderna");
/// assert_eq!(query.size, Some(12.5));
/// assert!(query.bold && query.italic);
/// ```
pub fn parse_font_shorthand(source: &str) -> Result<FontQuery, ParseError> {
    let mut input = LocatingSlice::new(source);
    let parsed = shorthand
        .parse_next(&mut input)
        .map_err(|_: winnow::error::ErrMode<ContextError>| missing_family(source.len(), source.len()))?;

    let family = parsed.family.trim();
    if family.is_empty() {
        return Err(missing_family(parsed.family_start, source.len()).into());
    }

    let has = |word: &str| parsed.keywords.iter().any(|k| k.eq_ignore_ascii_case(word));
    let query = FontQuery {
        family: family.to_string(),
        size: parsed.size,
        bold: has("bold"),
        italic: has("italic"),
    };
    trace!(query:?; "Parsed font shorthand");
    Ok(query)
}

fn missing_family(start: usize, end: usize) -> Diagnostic {
    Diagnostic::error("missing font family")
        .with_code(ErrorCode::E200)
        .with_label(Span::new(start..end), "expected a family name")
        .with_help("name the family last, as in `bold 12px Moderna`")
}

/// One operation of a glyph outline.
struct GlyphOp {
    letter: char,
    span: Span,
    values: Vec<(f64, Span)>,
}

impl GlyphOp {
    fn expected(&self) -> Option<usize> {
        match self.letter {
            'm' | 'r' => Some(2),
            'v' => Some(6),
            'x' => Some(0),
            _ => None,
        }
    }

    fn values_span(&self) -> Span {
        match (self.values.first(), self.values.last()) {
            (Some((_, first)), Some((_, last))) => first.union(*last),
            _ => self.span,
        }
    }
}

struct GlyphBuilder {
    path: Path,
    scale: f64,
    origin: Point,
    diagnostics: DiagnosticCollector,
}

impl GlyphBuilder {
    fn apply(&mut self, op: GlyphOp) {
        let Some(expected) = op.expected() else {
            self.diagnostics.emit(
                Diagnostic::warning(format!("unknown glyph operation `{}`", op.letter))
                    .with_code(ErrorCode::E202)
                    .with_label(op.span.union(op.values_span()), "skipped"),
            );
            return;
        };
        if op.values.len() != expected {
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "glyph operation `{}` takes {expected} coordinates, found {}",
                    op.letter,
                    op.values.len()
                ))
                .with_code(ErrorCode::E201)
                .with_label(op.values_span(), ErrorCode::E201.description()),
            );
            return;
        }

        let s = self.scale;
        let v: Vec<f64> = op.values.iter().map(|(value, _)| value * s).collect();
        match op.letter {
            'm' => self
                .path
                .move_to(self.origin.x() + v[0], self.origin.y() + v[1]),
            'r' => self.path.line_by(v[0], v[1]),
            'v' => self.path.curve_by(v[0], v[1], v[2], v[3], v[4], v[5]),
            _ => self.path.close(),
        };
    }
}

/// Parse a Cufón glyph outline into a path.
///
/// Coordinates are multiplied by `scale`; absolute moves are offset by
/// `origin`. The outline is closed at the end unless it already closes.
///
/// # Errors
///
/// Returns lexer errors and [`ErrorCode::E201`] for operations with the wrong
/// number of coordinates. Unknown operations are skipped with a warning.
///
/// # Examples
///
/// ```
/// # use quill_core::geometry::Point;
/// # use quill_parser::parse_glyph_outline;
/// let path = parse_glyph_outline("10,0r5,0r0,5", 2.0, Point::new(100.0, 50.0)).unwrap();
/// assert_eq!(path.to_svg(), "M 120 50 l 10 0 l 0 10 Z");
/// ```
pub fn parse_glyph_outline(outline: &str, scale: f64, origin: Point) -> Result<Path, ParseError> {
    let outline = outline
        .find(['e', 'E'])
        .map_or(outline, |end| &outline[..end]);
    let tokens = lexer::tokenize(outline)?;

    let mut builder = GlyphBuilder {
        path: Path::new(),
        scale,
        origin,
        diagnostics: DiagnosticCollector::new(),
    };
    if tokens.is_empty() {
        return Ok(builder.path);
    }

    let mut op = GlyphOp {
        letter: 'm',
        span: Span::new(0..0),
        values: Vec::new(),
    };
    for PositionedToken { token, span } in tokens {
        match token {
            Token::Command(letter) => {
                let next = GlyphOp {
                    letter,
                    span,
                    values: Vec::new(),
                };
                let previous = std::mem::replace(&mut op, next);
                // a leading letter makes the implicit move empty
                if !(previous.span.is_empty() && previous.values.is_empty()) {
                    builder.apply(previous);
                }
            }
            Token::Number(value) => op.values.push((value, span)),
            Token::Separator => {}
        }
    }
    let closes = op.letter == 'x';
    builder.apply(op);
    if !closes {
        builder.path.close();
    }

    let GlyphBuilder {
        path, diagnostics, ..
    } = builder;
    diagnostics.finish().map(|()| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_full() {
        let query = parse_font_shorthand("bold italic 16px/20px \"Moderna Sans\"").unwrap();
        assert_eq!(query.family, "Moderna Sans");
        assert_eq!(query.size, Some(16.0));
        assert!(query.bold);
        assert!(query.italic);
    }

    #[test]
    fn test_shorthand_family_only() {
        let query = parse_font_shorthand("  Moderna").unwrap();
        assert_eq!(query, FontQuery::new("Moderna"));
    }

    #[test]
    fn test_shorthand_keywords_case_insensitive() {
        let query = parse_font_shorthand("BOLD Normal 9pt Tiny").unwrap();
        assert!(query.bold);
        assert!(!query.italic);
        assert_eq!(query.size, Some(9.0));
    }

    #[test]
    fn test_shorthand_size_units() {
        for (source, size) in [
            ("12px A", 12.0),
            ("1.5em A", 1.5),
            ("80% A", 80.0),
            ("10ex A", 10.0),
            ("7 A", 7.0),
        ] {
            assert_eq!(parse_font_shorthand(source).unwrap().size, Some(size), "{source}");
        }
    }

    #[test]
    fn test_shorthand_size_without_family_is_family() {
        let query = parse_font_shorthand("12px").unwrap();
        assert_eq!(query.family, "12px");
        assert_eq!(query.size, None);
    }

    #[test]
    fn test_shorthand_keyword_needs_whitespace() {
        let query = parse_font_shorthand("bolder").unwrap();
        assert_eq!(query.family, "bolder");
        assert!(!query.bold);
    }

    #[test]
    fn test_shorthand_missing_family() {
        for source in ["", "   ", "bold 12px ", "bold 12px \""] {
            let err = parse_font_shorthand(source).unwrap_err();
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E200), "{source:?}");
        }
    }

    #[test]
    fn test_shorthand_stops_at_closing_quote() {
        let query = parse_font_shorthand("12px \"Tiny\", serif").unwrap();
        assert_eq!(query.family, "Tiny");
    }

    #[test]
    fn test_glyph_outline_ops() {
        let path =
            parse_glyph_outline("235,0r-39,0v0,29,-18,49,-40,58x", 0.5, Point::new(10.0, 20.0))
                .unwrap();
        assert_eq!(
            path.to_svg(),
            "M 127.5 20 l -19.5 0 c 0 14.5 -9 24.5 -20 29 Z"
        );
    }

    #[test]
    fn test_glyph_outline_multiple_contours() {
        let path = parse_glyph_outline("0,0r1,0m5,5r1,0", 1.0, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(path.to_svg(), "M 0 0 l 1 0 M 5 5 l 1 0 Z");
    }

    #[test]
    fn test_glyph_outline_end_marker() {
        let path = parse_glyph_outline("0,0r1,0e9,9", 1.0, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(path.to_svg(), "M 0 0 l 1 0 Z");
    }

    #[test]
    fn test_glyph_outline_empty() {
        assert!(parse_glyph_outline("", 1.0, Point::new(3.0, 3.0)).unwrap().is_empty());
    }

    #[test]
    fn test_glyph_outline_wrong_count() {
        let err = parse_glyph_outline("0,0r1,0,2", 1.0, Point::new(0.0, 0.0)).unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(
            diag.message(),
            "glyph operation `r` takes 2 coordinates, found 3"
        );
    }

    #[test]
    fn test_glyph_outline_unknown_op_is_skipped() {
        let path = parse_glyph_outline("0,0q4,4r1,0", 1.0, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(path.to_svg(), "M 0 0 l 1 0 Z");
    }

    #[test]
    fn test_glyph_outline_leading_letter() {
        // no implicit move coordinates, the outline starts with a line
        let path = parse_glyph_outline("r1,0", 1.0, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(path.to_svg(), "l 1 0 Z");
    }
}
