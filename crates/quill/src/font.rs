//! Registered glyph fonts and glyph text.
//!
//! A [`FontRegistry`] holds Cufón glyph tables keyed by family, weight class
//! and style. [`glyph_text`] lays a string out with one of them and returns
//! the outlines as a single [`Path`], so glyph text renders as an ordinary
//! shape on every backend.

use std::collections::HashMap;

use log::{info, warn};

use quill_core::{
    font::{FontKey, FontQuery, FontTable},
    geometry::Point,
    path::Path,
};
use quill_parser::parse_glyph_outline;

use crate::error::QuillError;

/// Glyph tables available to glyph text.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    tables: HashMap<FontKey, FontTable>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, replacing any table with the same key.
    pub fn register(&mut self, table: FontTable) -> FontKey {
        let key = table.key();
        info!(
            family = key.family(),
            weight = key.weight_name(),
            style = key.style_name();
            "Registered font"
        );
        self.tables.insert(key.clone(), table);
        key
    }

    /// Parses a Cufón script or bare JSON table and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Font`] when the table is malformed.
    pub fn register_source(&mut self, source: &str) -> Result<FontKey, QuillError> {
        let table = FontTable::from_cufon_source(source)?;
        Ok(self.register(table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The table matching the family and style flags of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::FontNotFound`] when nothing was registered
    /// under that key.
    pub fn lookup(&self, query: &FontQuery) -> Result<&FontTable, QuillError> {
        let key = query.key();
        self.tables
            .get(&key)
            .ok_or_else(|| QuillError::FontNotFound {
                family: key.family().to_string(),
                weight: key.weight_name().to_string(),
                style: key.style_name().to_string(),
            })
    }
}

/// Outlines of a laid out string.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphText {
    pub path: Path,
    /// Width of the widest line.
    pub width: f64,
    /// Height of all lines, from the first ascent to the last descent.
    pub height: f64,
}

/// Lays `text` out in `table` at `size` pixels.
///
/// Each glyph is placed at the running advance on the line's baseline,
/// `ascent` below the line top. Missing characters use the space glyph. Lines
/// split on `\n` and advance by `ascent - descent`. A glyph whose outline
/// fails to parse is skipped with a warning; its advance still counts.
pub fn glyph_text(table: &FontTable, text: &str, size: f64) -> GlyphText {
    let face = table.face();
    let scale = size / face.units_per_em();
    let line_advance = scale * (face.ascent() - face.descent());

    let mut path = Path::new();
    let mut width: f64 = 0.0;
    let lines: Vec<&str> = text.split('\n').collect();

    for (row, line) in lines.iter().enumerate() {
        let baseline = row as f64 * line_advance + scale * face.ascent();
        let mut x = 0.0;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if let Some(outline) = table.glyph(ch).and_then(|glyph| glyph.outline()) {
                match parse_glyph_outline(outline, scale, Point::new(x, baseline)) {
                    Ok(glyph) => {
                        path.append(&glyph);
                    }
                    Err(err) => {
                        warn!(glyph:% = ch, err:%; "Skipping broken glyph outline");
                    }
                }
            }
            x += scale * table.advance(ch);
            if let Some(next) = chars.peek() {
                x -= scale * table.kerning(ch, *next);
            }
        }
        width = width.max(x);
    }

    GlyphText {
        path,
        width,
        height: lines.len() as f64 * line_advance,
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    const TABLE: &str = r#"{
        "w": 100,
        "face": {
            "font-family": "Blocky",
            "font-weight": 400,
            "font-stretch": "normal",
            "units-per-em": "100",
            "ascent": "80",
            "descent": "-20"
        },
        "glyphs": {
            " ": {"w": 50},
            "A": {"d": "0,-80r100,0r0,80r-100,0", "w": 100, "k": {"V": 10}},
            "V": {"d": "0,-80r50,80r50,-80"},
            "?": {"d": "0,0r5", "w": 40}
        }
    }"#;

    fn table() -> FontTable {
        FontTable::from_json(TABLE).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = FontRegistry::new();
        let key = registry.register(table());
        assert_eq!(key.family(), "Blocky");
        assert_eq!(registry.len(), 1);

        assert!(registry.lookup(&FontQuery::new("Blocky")).is_ok());
        let err = registry
            .lookup(&FontQuery::new("Blocky").with_bold(true))
            .unwrap_err();
        assert!(matches!(
            err,
            QuillError::FontNotFound { ref weight, .. } if weight == "bold"
        ));
    }

    #[test]
    fn test_register_cufon_script() {
        let mut registry = FontRegistry::new();
        let source = format!("Cufon.registerFont({TABLE});");
        registry.register_source(&source).unwrap();
        assert!(!registry.is_empty());

        assert!(matches!(
            registry.register_source("Cufon.registerFont();"),
            Err(QuillError::Font(_))
        ));
    }

    #[test]
    fn test_advance_and_kerning() {
        let text = glyph_text(&table(), "AV", 20.0);
        // 100 + 100 font units minus 10 of kerning, at 0.2 px per unit.
        assert_approx_eq!(f64, text.width, 38.0, epsilon = 1e-9);
        assert_approx_eq!(f64, text.height, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_glyphs_sit_on_the_baseline() {
        let text = glyph_text(&table(), "A", 100.0);
        let bounds = text.path.measure();
        assert_approx_eq!(f64, bounds.top(), 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, bounds.bottom(), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_glyph_uses_space() {
        let text = glyph_text(&table(), "A~", 100.0);
        assert_approx_eq!(f64, text.width, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lines_stack() {
        let text = glyph_text(&table(), "A\nAA", 100.0);
        assert_approx_eq!(f64, text.width, 200.0, epsilon = 1e-9);
        assert_approx_eq!(f64, text.height, 200.0, epsilon = 1e-9);
        assert_approx_eq!(f64, text.path.measure().bottom(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_broken_glyph_is_skipped() {
        let text = glyph_text(&table(), "?A", 100.0);
        assert_approx_eq!(f64, text.width, 140.0, epsilon = 1e-9);
        assert_approx_eq!(f64, text.path.measure().left(), 40.0, epsilon = 1e-9);
    }
}
