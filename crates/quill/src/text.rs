//! Text measurement.
//!
//! Text nodes need a box for default rotation pivots, `resize_to` and
//! gradient defaults. Lines are shaped with `cosmic-text` against the system
//! fonts; a shared [`FontSystem`] is created on first use because loading the
//! font database is expensive.

use std::sync::{LazyLock, Mutex, PoisonError};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use log::{debug, info};

use quill_core::{font::FontQuery, geometry::Rect};

use crate::{
    config::TextConfig,
    node::{TextAlign, TextContent},
};

/// Line advance as a multiple of the font size, shared with the SVG row
/// layout.
pub const LINE_HEIGHT: f64 = 1.1;

/// Average advance as a multiple of the font size, used when shaping
/// produced no glyphs (for example when no system font is installed).
const FALLBACK_ADVANCE: f64 = 0.55;

static TEXT_MEASURER: LazyLock<TextMeasurer> = LazyLock::new(TextMeasurer::new);

/// Measures text with a reusable [`FontSystem`].
struct TextMeasurer {
    font_system: Mutex<FontSystem>,
}

impl TextMeasurer {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    /// Width in pixels of a single line.
    fn line_width(&self, line: &str, query: &FontQuery, size: f64) -> f64 {
        if line.is_empty() {
            return 0.0;
        }
        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let font_size = size as f32;
        let metrics = Metrics::new(font_size, font_size * LINE_HEIGHT as f32);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new()
            .family(family(&query.family))
            .weight(if query.bold { Weight::BOLD } else { Weight::NORMAL })
            .style(if query.italic { Style::Italic } else { Style::Normal });

        buffer.set_size(None, None);
        buffer.set_text(line, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let width = buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
            .fold(0.0f32, f32::max);

        if width > 0.0 || line.trim().is_empty() {
            f64::from(width)
        } else {
            debug!(family = query.family; "No glyphs shaped, estimating width");
            line.chars().count() as f64 * size * FALLBACK_ADVANCE
        }
    }
}

fn family(name: &str) -> Family<'_> {
    match name.trim().to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name.trim()),
    }
}

/// Width in pixels of `line` set in `query`, at `query.size` or the
/// configured default size.
pub fn measure_line(line: &str, query: &FontQuery, defaults: &TextConfig) -> f64 {
    let size = query.size.unwrap_or(defaults.font_size());
    TEXT_MEASURER.line_width(line, query, size)
}

/// The box of a text node in its own user space.
///
/// Text on a path takes the path's box. Otherwise the width is the widest
/// line, the height is one line advance per line, and the box is shifted left
/// by the alignment anchor.
pub fn text_box(content: &TextContent, defaults: &TextConfig) -> Rect {
    if let Some(path) = content.path() {
        return path.measure().to_rect();
    }
    let query = content
        .font()
        .map(|font| font.query(defaults))
        .unwrap_or_else(|| FontQuery::new(defaults.font_family()).with_size(defaults.font_size()));
    let size = query.size.unwrap_or(defaults.font_size());

    let lines = content.lines();
    let width = lines
        .iter()
        .map(|line| TEXT_MEASURER.line_width(line, &query, size))
        .fold(0.0, f64::max);
    let height = lines.len() as f64 * LINE_HEIGHT * size;
    let left = match content.align().unwrap_or_default() {
        TextAlign::Start => 0.0,
        TextAlign::Middle => -width / 2.0,
        TextAlign::End => -width,
    };
    Rect::new(left, 0.0, width, height)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use quill_core::path::Path;

    use super::*;
    use crate::node::TextFont;

    fn content(text: &str) -> TextContent {
        TextContent::new(text)
    }

    #[test]
    fn test_empty_line_has_no_width() {
        let query = FontQuery::new("sans-serif");
        assert_eq!(measure_line("", &query, &TextConfig::default()), 0.0);
    }

    #[test]
    fn test_text_box_grows_with_lines() {
        let defaults = TextConfig::new("sans-serif", 10.0);
        let one = text_box(&content("Hello"), &defaults);
        let two = text_box(&content("Hello\nWorld"), &defaults);

        assert!(one.width() > 0.0);
        assert_approx_eq!(f64, one.height(), 11.0);
        assert_approx_eq!(f64, two.height(), 22.0);
        assert_approx_eq!(f64, one.top(), 0.0);
    }

    #[test]
    fn test_text_box_follows_alignment() {
        let defaults = TextConfig::default();
        let mut centered = content("Hello");
        centered.set_align(TextAlign::Middle);
        let mut ended = content("Hello");
        ended.set_align(TextAlign::End);

        let centered = text_box(&centered, &defaults);
        let ended = text_box(&ended, &defaults);
        assert_approx_eq!(f64, centered.left(), -centered.width() / 2.0);
        assert_approx_eq!(f64, ended.left(), -ended.width());
    }

    #[test]
    fn test_font_size_scales_height() {
        let mut large = content("Hello");
        large.set_font(TextFont::from("bold 20px sans-serif"));
        let bounds = text_box(&large, &TextConfig::default());
        assert_approx_eq!(f64, bounds.height(), 22.0);
    }

    #[test]
    fn test_text_on_path_takes_path_box() {
        let mut path = Path::new();
        path.move_to(10.0, 10.0).line_to(110.0, 60.0);
        let mut on_path = content("Along");
        on_path.set_path(Some(path));

        assert_eq!(
            text_box(&on_path, &TextConfig::default()),
            Rect::new(10.0, 10.0, 100.0, 50.0)
        );
    }
}
