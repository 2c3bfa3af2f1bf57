//! The path command model.
//!
//! A [`Path`] is an ordered list of raw [`Segment`]s exactly as they were
//! written or pushed: relative commands stay relative and curves are not
//! flattened, so serializing a path reproduces its commands.
//!
//! # Overview
//!
//! - [`Command`] - One drawing command with its parameters
//! - [`Segment`] - A command plus its absolute/relative flag
//! - [`Path`] - The segment list, builder methods and memoized measurements
//! - [`PathVisitor`] - Replay callbacks receiving absolute coordinates
//! - [`CircularArc`] - The circular arc description offered to visitors
//!
//! Text parsing lives in the `quill-parser` crate; this module only models
//! and replays commands.
//!
//! # Examples
//!
//! ```
//! # use quill_core::path::Path;
//! let mut path = Path::new();
//! path.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(10.0, 10.0).close();
//!
//! assert_eq!(path.to_svg(), "M 0 0 L 10 0 L 10 10 Z");
//!
//! let bounds = path.measure();
//! assert_eq!((bounds.width(), bounds.height()), (10.0, 10.0));
//! ```

mod measure;
mod visitor;
mod vml;

use std::{cell::OnceCell, fmt};

pub use visitor::{CircularArc, PathVisitor, flatten_curve};
pub use vml::round_coordinate;

use crate::{
    geometry::{Bounds, Point, format_number},
    transform::Transform,
};

/// Parameters of an elliptical arc command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub rx: f64,
    pub ry: f64,
    /// X axis rotation in degrees.
    pub rotation: f64,
    pub large_arc: bool,
    /// `true` for the positive angle direction, clockwise on screen.
    pub sweep: bool,
    pub to: Point,
}

/// A single path command with its parameters.
///
/// Coordinates are interpreted relative to the current point when the owning
/// [`Segment`] is relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Move(Point),
    Line(Point),
    Horizontal(f64),
    Vertical(f64),
    Cubic { c1: Point, c2: Point, to: Point },
    SmoothCubic { c2: Point, to: Point },
    Quadratic { control: Point, to: Point },
    SmoothQuadratic(Point),
    Arc(ArcParams),
    Close,
}

impl Command {
    /// Number of numeric parameters the command takes.
    pub fn parameter_count(&self) -> usize {
        match self {
            Self::Move(_) | Self::Line(_) | Self::SmoothQuadratic(_) => 2,
            Self::Horizontal(_) | Self::Vertical(_) => 1,
            Self::Cubic { .. } => 6,
            Self::SmoothCubic { .. } | Self::Quadratic { .. } => 4,
            Self::Arc(_) => 7,
            Self::Close => 0,
        }
    }

    /// The upper case command letter.
    fn letter(&self) -> char {
        match self {
            Self::Move(_) => 'M',
            Self::Line(_) => 'L',
            Self::Horizontal(_) => 'H',
            Self::Vertical(_) => 'V',
            Self::Cubic { .. } => 'C',
            Self::SmoothCubic { .. } => 'S',
            Self::Quadratic { .. } => 'Q',
            Self::SmoothQuadratic(_) => 'T',
            Self::Arc(_) => 'A',
            Self::Close => 'Z',
        }
    }

    fn parameters(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match *self {
            Self::Move(p) | Self::Line(p) | Self::SmoothQuadratic(p) => vec![p.x(), p.y()],
            Self::Horizontal(v) | Self::Vertical(v) => vec![v],
            Self::Cubic { c1, c2, to } => vec![c1.x(), c1.y(), c2.x(), c2.y(), to.x(), to.y()],
            Self::SmoothCubic { c2: control, to } | Self::Quadratic { control, to } => {
                vec![control.x(), control.y(), to.x(), to.y()]
            }
            Self::Arc(arc) => vec![
                arc.rx,
                arc.ry,
                arc.rotation,
                flag(arc.large_arc),
                flag(arc.sweep),
                arc.to.x(),
                arc.to.y(),
            ],
            Self::Close => Vec::new(),
        }
    }
}

/// A command tagged absolute or relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    command: Command,
    relative: bool,
}

impl Segment {
    pub fn new(command: Command, relative: bool) -> Self {
        Self { command, relative }
    }

    pub fn absolute(command: Command) -> Self {
        Self::new(command, false)
    }

    pub fn relative(command: Command) -> Self {
        Self::new(command, true)
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    /// The command letter, lower case when relative.
    pub fn letter(&self) -> char {
        let letter = self.command.letter();
        if self.relative {
            letter.to_ascii_lowercase()
        } else {
            letter
        }
    }

    fn write_tokens(&self, tokens: &mut Vec<String>) {
        tokens.push(self.letter().to_string());
        tokens.extend(self.command.parameters().into_iter().map(format_number));
    }
}

/// Memoized results derived from the segment list.
#[derive(Debug, Clone, Default)]
struct PathCache {
    svg: OnceCell<String>,
    /// VML output together with the precision it was produced for.
    vml: OnceCell<(f64, String)>,
    bounds: OnceCell<Bounds>,
    length: OnceCell<f64>,
}

/// An ordered list of path segments with memoized measurements.
///
/// Every mutation clears the memoized values.
#[derive(Debug, Clone, Default)]
pub struct Path {
    segments: Vec<Segment>,
    cache: PathCache,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
            cache: PathCache::default(),
        }
    }
}

/// Treats zero and NaN as a missing radius.
fn radius_or(value: f64, fallback: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        fallback
    } else {
        value
    }
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: Segment) -> &mut Self {
        self.cache = PathCache::default();
        self.segments.push(segment);
        self
    }

    /// Appends every segment of `other`.
    pub fn append(&mut self, other: &Path) -> &mut Self {
        self.cache = PathCache::default();
        self.segments.extend_from_slice(&other.segments);
        self
    }

    /// Removes every segment.
    pub fn reset(&mut self) -> &mut Self {
        self.cache = PathCache::default();
        self.segments.clear();
        self
    }

    fn push_command(&mut self, command: Command, relative: bool) -> &mut Self {
        self.push(Segment::new(command, relative))
    }

    pub fn move_by(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_command(Command::Move(Point::new(x, y)), true)
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_command(Command::Move(Point::new(x, y)), false)
    }

    pub fn line_by(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_command(Command::Line(Point::new(x, y)), true)
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_command(Command::Line(Point::new(x, y)), false)
    }

    pub fn horizontal_by(&mut self, x: f64) -> &mut Self {
        self.push_command(Command::Horizontal(x), true)
    }

    pub fn horizontal_to(&mut self, x: f64) -> &mut Self {
        self.push_command(Command::Horizontal(x), false)
    }

    pub fn vertical_by(&mut self, y: f64) -> &mut Self {
        self.push_command(Command::Vertical(y), true)
    }

    pub fn vertical_to(&mut self, y: f64) -> &mut Self {
        self.push_command(Command::Vertical(y), false)
    }

    /// Relative cubic Bézier.
    pub fn curve_by(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        let command = Command::Cubic {
            c1: Point::new(c1x, c1y),
            c2: Point::new(c2x, c2y),
            to: Point::new(x, y),
        };
        self.push_command(command, true)
    }

    /// Absolute cubic Bézier.
    pub fn curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        let command = Command::Cubic {
            c1: Point::new(c1x, c1y),
            c2: Point::new(c2x, c2y),
            to: Point::new(x, y),
        };
        self.push_command(command, false)
    }

    /// Relative cubic whose first control point mirrors the previous one.
    pub fn smooth_curve_by(&mut self, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        let command = Command::SmoothCubic {
            c2: Point::new(c2x, c2y),
            to: Point::new(x, y),
        };
        self.push_command(command, true)
    }

    pub fn smooth_curve_to(&mut self, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        let command = Command::SmoothCubic {
            c2: Point::new(c2x, c2y),
            to: Point::new(x, y),
        };
        self.push_command(command, false)
    }

    pub fn quad_by(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        let command = Command::Quadratic {
            control: Point::new(cx, cy),
            to: Point::new(x, y),
        };
        self.push_command(command, true)
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        let command = Command::Quadratic {
            control: Point::new(cx, cy),
            to: Point::new(x, y),
        };
        self.push_command(command, false)
    }

    pub fn smooth_quad_by(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_command(Command::SmoothQuadratic(Point::new(x, y)), true)
    }

    pub fn smooth_quad_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push_command(Command::SmoothQuadratic(Point::new(x, y)), false)
    }

    /// Relative clockwise arc ending at `(x, y)`.
    ///
    /// A zero or NaN `rx` falls back to `x`, and a zero or NaN `ry` falls back
    /// to `rx` and then `y`, so `arc_by(10.0, 10.0, 0.0, 0.0, false)` draws a
    /// quarter circle of radius 10.
    pub fn arc_by(&mut self, x: f64, y: f64, rx: f64, ry: f64, large: bool) -> &mut Self {
        self.push_arc(x, y, rx, ry, large, true, true)
    }

    pub fn arc_to(&mut self, x: f64, y: f64, rx: f64, ry: f64, large: bool) -> &mut Self {
        self.push_arc(x, y, rx, ry, large, true, false)
    }

    /// Like [`arc_by`](Self::arc_by) with the opposite sweep.
    pub fn counter_arc_by(&mut self, x: f64, y: f64, rx: f64, ry: f64, large: bool) -> &mut Self {
        self.push_arc(x, y, rx, ry, large, false, true)
    }

    pub fn counter_arc_to(&mut self, x: f64, y: f64, rx: f64, ry: f64, large: bool) -> &mut Self {
        self.push_arc(x, y, rx, ry, large, false, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_arc(
        &mut self,
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        large: bool,
        sweep: bool,
        relative: bool,
    ) -> &mut Self {
        let arc = ArcParams {
            rx: radius_or(rx, x).abs(),
            ry: radius_or(radius_or(ry, rx), y).abs(),
            rotation: 0.0,
            large_arc: large,
            sweep,
            to: Point::new(x, y),
        };
        self.push_command(Command::Arc(arc), relative)
    }

    /// Closes the current subpath.
    pub fn close(&mut self) -> &mut Self {
        self.push_command(Command::Close, false)
    }

    /// Replays the path through `visitor` in absolute coordinates.
    pub fn visit<V: PathVisitor + ?Sized>(&self, visitor: &mut V) {
        visitor::replay(&self.segments, visitor);
    }

    /// SVG path data: space separated tokens with the original command letters.
    pub fn to_svg(&self) -> &str {
        self.cache.svg.get_or_init(|| {
            let mut tokens = Vec::new();
            for segment in &self.segments {
                segment.write_tokens(&mut tokens);
            }
            tokens.join(" ")
        })
    }

    /// VML path data with every coordinate multiplied by `precision`.
    ///
    /// The result is not terminated; renderers append the closing `e`. Only
    /// the first precision asked for is memoized.
    pub fn to_vml(&self, precision: f64) -> String {
        let (cached, vml) = self
            .cache
            .vml
            .get_or_init(|| (precision, vml::to_vml(self, precision)));
        if *cached == precision {
            vml.clone()
        } else {
            vml::to_vml(self, precision)
        }
    }

    /// The bounding box. Curves contribute their control hull, circular arcs
    /// their exact extents. An empty path measures as an all zero box.
    pub fn measure(&self) -> Bounds {
        *self.cache.bounds.get_or_init(|| measure::bounds(self))
    }

    /// Total length with curves flattened.
    pub fn measure_length(&self) -> f64 {
        *self.cache.length.get_or_init(|| measure::length(self))
    }

    /// The position and direction at arclength `length`.
    ///
    /// Returns `Transform(cos, sin, -sin, cos, x, y)` for the point on the
    /// flattened path, or `None` when `length` lies past the end.
    pub fn point_at(&self, length: f64) -> Option<Transform> {
        measure::point_at(self, length)
    }
}

/// Renders [`Path::to_svg`].
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_svg())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn square() -> Path {
        let mut path = Path::new();
        path.move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(10.0, 10.0)
            .close();
        path
    }

    #[test]
    fn test_to_svg_preserves_letters() {
        let mut path = Path::new();
        path.move_by(1.0, 2.0)
            .curve_to(1.0, 2.0, 3.0, 4.0, 5.5, 6.0)
            .smooth_quad_by(-1.0, 0.0)
            .arc_to(20.0, 20.0, 5.0, 0.0, true)
            .close();
        assert_eq!(
            path.to_svg(),
            "m 1 2 C 1 2 3 4 5.5 6 t -1 0 A 5 5 0 1 1 20 20 Z"
        );
        assert_eq!(path.to_string(), path.to_svg());
    }

    #[test]
    fn test_arc_radius_fallbacks() {
        let mut path = Path::new();
        path.arc_by(-8.0, 6.0, 0.0, f64::NAN, false);
        let Command::Arc(arc) = path.segments()[0].command() else {
            panic!("expected arc");
        };
        assert_eq!(arc.rx, 8.0);
        assert_eq!(arc.ry, 6.0);

        path.reset().counter_arc_to(3.0, 4.0, 0.0, 0.0, false);
        let Command::Arc(arc) = path.segments()[0].command() else {
            panic!("expected arc");
        };
        assert_eq!((arc.rx, arc.ry), (3.0, 4.0));
        assert!(!arc.sweep);
    }

    #[test]
    fn test_mutation_clears_cache() {
        let mut path = square();
        assert_eq!(path.measure().right(), 10.0);
        assert_eq!(path.to_svg(), "M 0 0 L 10 0 L 10 10 Z");

        path.line_to(50.0, 50.0);
        assert_eq!(path.measure().right(), 50.0);
        assert!(path.to_svg().ends_with("L 50 50"));

        path.reset();
        assert_eq!(path.to_svg(), "");
        assert_eq!(path.measure(), Bounds::default());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = square();
        let mut copy = original.clone();
        copy.line_to(100.0, 100.0);
        assert_eq!(original.segments().len(), 4);
        assert_eq!(copy.segments().len(), 5);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_square_measurements() {
        let path = square();
        let bounds = path.measure();
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(bounds.width(), 10.0);
        assert_eq!(bounds.height(), 10.0);
        assert_approx_eq!(f64, path.measure_length(), 20.0 + 200f64.sqrt());
    }

    #[test]
    fn test_to_vml_caches_per_precision() {
        let path = square();
        assert_eq!(path.to_vml(100.0), "m 0 0 l 1000 0 l 1000 1000 x m 0 0");
        assert_eq!(path.to_vml(1.0), "m 0 0 l 10 0 l 10 10 x m 0 0");
        assert_eq!(path.to_vml(100.0), "m 0 0 l 1000 0 l 1000 1000 x m 0 0");
    }

    #[test]
    fn test_to_vml_recomputed_after_push() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        assert_eq!(path.to_vml(1.0), "m 0 0");
        path.line_to(3.0, 4.0);
        assert_eq!(path.to_vml(1.0), "m 0 0 l 3 4");
    }

    #[test]
    fn test_from_iterator() {
        let path: Path = square().segments().iter().copied().collect();
        assert_eq!(path, square());
    }
}
