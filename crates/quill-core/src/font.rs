//! Cufón glyph tables.
//!
//! A [`FontTable`] is the JSON object produced by the Cufón font generator:
//! a default advance width, a `face` block of metrics and a map from
//! characters to [`Glyph`]s. Glyph outlines stay in their compact delta
//! notation here; `quill-parser` turns them into paths.
//!
//! Cufón writes many numeric face values as strings (`"units-per-em":"360"`),
//! so numeric fields accept either form.
//!
//! # Examples
//!
//! ```
//! # use quill_core::font::FontTable;
//! let table = FontTable::from_json(r#"{
//!     "w": 200,
//!     "face": {"font-family": "Tiny", "font-weight": 700, "units-per-em": "360",
//!              "ascent": "288", "descent": "-72"},
//!     "glyphs": {" ": {"w": 90}, "A": {"d": "0,0r10,0", "k": {"V": 12}}}
//! }"#).unwrap();
//!
//! assert_eq!(table.face().family(), "Tiny");
//! assert!(table.face().is_bold());
//! assert_eq!(table.advance('A'), 200.0);
//! assert_eq!(table.kerning('A', 'V'), 12.0);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, de};
use thiserror::Error;

/// Errors produced while loading a glyph table.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("invalid font JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid font table: {0}")]
    Invalid(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_number<E: de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(text) => match text.trim() {
                "normal" => Ok(400.0),
                "bold" => Ok(700.0),
                trimmed => trimmed
                    .parse()
                    .map_err(|_| E::custom(format!("expected a number, found `{text}`"))),
            },
        }
    }
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_number()
}

fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_number)
        .transpose()
}

fn default_weight() -> f64 {
    400.0
}

fn default_stretch() -> String {
    "normal".to_string()
}

/// Face metrics and style of a glyph table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontFace {
    #[serde(rename = "font-family")]
    family: String,

    #[serde(rename = "font-weight", default = "default_weight", deserialize_with = "number")]
    weight: f64,

    #[serde(rename = "font-stretch", default = "default_stretch")]
    stretch: String,

    #[serde(rename = "units-per-em", deserialize_with = "number")]
    units_per_em: f64,

    #[serde(deserialize_with = "number")]
    ascent: f64,

    #[serde(deserialize_with = "number")]
    descent: f64,
}

impl FontFace {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn stretch(&self) -> &str {
        &self.stretch
    }

    pub fn units_per_em(&self) -> f64 {
        self.units_per_em
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    /// Distance below the baseline, negative in Cufón tables.
    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// Weights above 400 count as bold.
    pub fn is_bold(&self) -> bool {
        self.weight > 400.0
    }

    /// Cufón marks italic faces with an `oblique` stretch.
    pub fn is_italic(&self) -> bool {
        self.stretch == "oblique"
    }
}

/// One character of a glyph table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Glyph {
    /// Outline in Cufón delta notation, without the leading `m` and trailing `x`.
    #[serde(default)]
    d: Option<String>,

    #[serde(default, deserialize_with = "optional_number")]
    w: Option<f64>,

    /// Adjustments subtracted from the advance when followed by the key.
    #[serde(default)]
    k: HashMap<char, f64>,
}

impl Glyph {
    pub fn outline(&self) -> Option<&str> {
        self.d.as_deref().filter(|d| !d.is_empty())
    }

    pub fn width(&self) -> Option<f64> {
        self.w
    }

    pub fn kerning(&self, next: char) -> f64 {
        self.k.get(&next).copied().unwrap_or(0.0)
    }
}

/// A complete Cufón glyph table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontTable {
    #[serde(default, deserialize_with = "optional_number")]
    w: Option<f64>,
    face: FontFace,
    glyphs: HashMap<char, Glyph>,
}

impl FontTable {
    /// Parses and validates a table from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`FontError`] for malformed JSON or non-positive `units-per-em`.
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let table: FontTable = serde_json::from_str(json)?;
        if !(table.face.units_per_em > 0.0) {
            return Err(FontError::Invalid(format!(
                "units-per-em must be positive, found {}",
                table.face.units_per_em
            )));
        }
        Ok(table)
    }

    /// Parses a table from a Cufón script such as
    /// `Cufon.registerFont({...});`, or from bare JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Invalid`] when no JSON object is present.
    pub fn from_cufon_source(source: &str) -> Result<Self, FontError> {
        let start = source.find('{');
        let end = source.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => Self::from_json(&source[start..=end]),
            _ => Err(FontError::Invalid("no font object found".to_string())),
        }
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// The glyph for `ch`, falling back to the space glyph.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&' '))
    }

    /// Advance width of `ch` in font units.
    pub fn advance(&self, ch: char) -> f64 {
        self.glyph(ch)
            .and_then(Glyph::width)
            .or(self.w)
            .unwrap_or(0.0)
    }

    /// Kerning between `ch` and `next` in font units.
    pub fn kerning(&self, ch: char, next: char) -> f64 {
        self.glyph(ch).map_or(0.0, |glyph| glyph.kerning(next))
    }

    pub fn key(&self) -> FontKey {
        FontKey::new(&self.face.family, self.face.is_bold(), self.face.is_italic())
    }
}

/// Registry key of a glyph table: family, weight class and style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.trim().to_string(),
            bold,
            italic,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// `"bold"` or `"normal"`.
    pub fn weight_name(&self) -> &'static str {
        if self.bold { "bold" } else { "normal" }
    }

    /// `"italic"` or `"normal"`.
    pub fn style_name(&self) -> &'static str {
        if self.italic { "italic" } else { "normal" }
    }
}

/// A font request: family, size in pixels and style flags.
///
/// Produced from a CSS `font` shorthand or from explicit properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontQuery {
    pub family: String,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
}

impl FontQuery {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// The registry key this query resolves to.
    pub fn key(&self) -> FontKey {
        FontKey::new(&self.family, self.bold, self.italic)
    }

    /// The query as a CSS `font` shorthand, e.g. `bold 12px Moderna`.
    pub fn to_css(&self, default_size: f64) -> String {
        let mut parts = Vec::new();
        if self.italic {
            parts.push("italic".to_string());
        }
        if self.bold {
            parts.push("bold".to_string());
        }
        let size = self.size.unwrap_or(default_size);
        parts.push(format!("{}px", crate::geometry::format_number(size)));
        parts.push(self.family.clone());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "w": 205,
        "face": {
            "font-family": "Moderna",
            "font-weight": 400,
            "font-stretch": "normal",
            "units-per-em": "360",
            "panose-1": "2 11 5 3 0 2 0 6 0 4",
            "ascent": "288",
            "descent": "-72"
        },
        "glyphs": {
            " ": {"w": 97},
            "A": {"d": "235,0r-39,0r-28,-78", "w": 261, "k": {"V": 78, "T": 77}},
            "B": {"d": "190,-199v0,29,-18,49,-40,58"}
        }
    }"#;

    #[test]
    fn test_parse_string_metrics() {
        let table = FontTable::from_json(TABLE).unwrap();
        let face = table.face();
        assert_eq!(face.units_per_em(), 360.0);
        assert_eq!(face.ascent(), 288.0);
        assert_eq!(face.descent(), -72.0);
        assert!(!face.is_bold());
        assert!(!face.is_italic());
    }

    #[test]
    fn test_advance_fallbacks() {
        let table = FontTable::from_json(TABLE).unwrap();
        assert_eq!(table.advance('A'), 261.0);
        // no own width, uses the table default
        assert_eq!(table.advance('B'), 205.0);
        // missing glyph, uses the space glyph
        assert_eq!(table.advance('?'), 97.0);
        assert_eq!(table.glyph('?').and_then(Glyph::outline), None);
    }

    #[test]
    fn test_kerning() {
        let table = FontTable::from_json(TABLE).unwrap();
        assert_eq!(table.kerning('A', 'V'), 78.0);
        assert_eq!(table.kerning('A', 'B'), 0.0);
        assert_eq!(table.kerning('B', 'A'), 0.0);
    }

    #[test]
    fn test_key_from_face() {
        let json = TABLE
            .replace("\"font-weight\": 400", "\"font-weight\": \"700\"")
            .replace("\"font-stretch\": \"normal\"", "\"font-stretch\": \"oblique\"");
        let key = FontTable::from_json(&json).unwrap().key();
        assert_eq!(key, FontKey::new("Moderna", true, true));
        assert_eq!(key.weight_name(), "bold");
        assert_eq!(key.style_name(), "italic");
    }

    #[test]
    fn test_query_key_and_css() {
        let query = FontQuery::new(" Moderna ").with_size(12.5).with_bold(true);
        assert_eq!(query.key(), FontKey::new("Moderna", true, false));
        assert_eq!(query.to_css(10.0), "bold 12.5px  Moderna ");
        assert_eq!(FontQuery::new("Tiny").with_italic(true).to_css(10.0), "italic 10px Tiny");
    }

    #[test]
    fn test_cufon_script_wrapper() {
        let script = format!("Cufon.registerFont({TABLE});\n");
        let table = FontTable::from_cufon_source(&script).unwrap();
        assert_eq!(table.face().family(), "Moderna");
        assert!(FontTable::from_cufon_source("nothing here").is_err());
    }

    #[test]
    fn test_invalid_tables() {
        assert!(matches!(
            FontTable::from_json("{\"face\": {}}"),
            Err(FontError::Json(_))
        ));
        let zero = TABLE.replace("\"360\"", "\"0\"");
        assert!(matches!(
            FontTable::from_json(&zero),
            Err(FontError::Invalid(_))
        ));
        let bad = TABLE.replace("\"288\"", "\"tall\"");
        assert!(FontTable::from_json(&bad).is_err());
    }
}
