//! Fill and stroke descriptors.
//!
//! Nodes keep their paint as plain values; each renderer translates them into
//! its own markup when the paint is applied.
//!
//! # Overview
//!
//! - [`Fill`]: none, a solid [`Color`], a [`LinearGradient`], a
//!   [`RadialGradient`] or an [`ImageFill`]
//! - [`GradientStops`]: ordered color stops shared by both gradient kinds
//! - [`Stroke`]: color, width, [`StrokeCap`] and [`StrokeJoin`]
//!
//! # Quick Start
//!
//! ```
//! use quill_core::color::Color;
//! use quill_core::paint::{GradientStops, LinearGradient, Stroke, StrokeCap};
//!
//! let stops = GradientStops::evenly([
//!     Color::from_rgb(255, 0, 0),
//!     Color::from_rgb(0, 0, 255),
//! ]);
//! let gradient = LinearGradient::with_angle(stops, 90.0);
//! assert_eq!(gradient.stops().len(), 2);
//!
//! let stroke = Stroke::new(Color::from_rgb(0, 0, 0), 2.0).with_cap(StrokeCap::Butt);
//! assert_eq!(stroke.cap().to_vml_value(), "flat");
//! ```

use std::str::FromStr;

use crate::{
    color::Color,
    geometry::{Point, Rect},
};

// =============================================================================
// Gradients
// =============================================================================

/// A color at an offset along a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    offset: f64,
    color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// Gradient stops ordered by offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientStops {
    stops: Vec<GradientStop>,
}

impl GradientStops {
    /// Spreads colors evenly from offset 0 to 1. A single color sits at 0.
    pub fn evenly(colors: impl IntoIterator<Item = Color>) -> Self {
        let colors: Vec<Color> = colors.into_iter().collect();
        let last = colors.len().saturating_sub(1).max(1) as f64;
        let stops = colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| GradientStop::new(i as f64 / last, color))
            .collect();
        Self { stops }
    }

    /// Uses explicit offsets, sorted ascending.
    pub fn at_offsets(stops: impl IntoIterator<Item = (f64, Color)>) -> Self {
        let mut stops: Vec<GradientStop> = stops
            .into_iter()
            .map(|(offset, color)| GradientStop::new(offset, color))
            .collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { stops }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GradientStop> {
        self.stops.iter()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn first(&self) -> Option<&GradientStop> {
        self.stops.first()
    }

    pub fn last(&self) -> Option<&GradientStop> {
        self.stops.last()
    }
}

/// Direction of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearGeometry {
    /// Angle in degrees across the node's bounding box. 270 runs top to bottom.
    Angle(f64),
    /// Explicit endpoints in user space.
    Points { from: Point, to: Point },
}

impl Default for LinearGeometry {
    fn default() -> Self {
        Self::Angle(270.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    stops: GradientStops,
    geometry: LinearGeometry,
}

impl LinearGradient {
    /// A gradient with the default vertical direction.
    pub fn new(stops: GradientStops) -> Self {
        Self {
            stops,
            geometry: LinearGeometry::default(),
        }
    }

    pub fn with_angle(stops: GradientStops, degrees: f64) -> Self {
        Self {
            stops,
            geometry: LinearGeometry::Angle(degrees),
        }
    }

    pub fn between(stops: GradientStops, from: Point, to: Point) -> Self {
        Self {
            stops,
            geometry: LinearGeometry::Points { from, to },
        }
    }

    pub fn stops(&self) -> &GradientStops {
        &self.stops
    }

    pub fn geometry(&self) -> LinearGeometry {
        self.geometry
    }
}

/// A radial gradient. Unset parameters default from the node's box when the
/// gradient is applied; see [`RadialGradient::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadialGradient {
    stops: GradientStops,
    focus_x: Option<f64>,
    focus_y: Option<f64>,
    radius_x: Option<f64>,
    radius_y: Option<f64>,
    center_x: Option<f64>,
    center_y: Option<f64>,
}

/// Concrete radial gradient parameters in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGeometry {
    pub focus: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub center: Point,
}

impl RadialGradient {
    pub fn new(stops: GradientStops) -> Self {
        Self {
            stops,
            ..Self::default()
        }
    }

    pub fn with_focus(mut self, x: f64, y: f64) -> Self {
        self.focus_x = Some(x);
        self.focus_y = Some(y);
        self
    }

    /// Sets the radii. Without `ry` the gradient is circular.
    pub fn with_radius(mut self, rx: f64, ry: Option<f64>) -> Self {
        self.radius_x = Some(rx);
        self.radius_y = ry;
        self
    }

    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center_x = Some(x);
        self.center_y = Some(y);
        self
    }

    pub fn stops(&self) -> &GradientStops {
        &self.stops
    }

    /// Fills in unset parameters from `bounds`.
    ///
    /// The focus defaults to the box center, `rx` to half the width, `ry` to
    /// `rx` (or half the height when `rx` is unset or zero) and the center to
    /// the focus.
    pub fn resolve(&self, bounds: Rect) -> RadialGeometry {
        let focus = Point::new(
            self.focus_x
                .unwrap_or(bounds.left() + bounds.width() * 0.5),
            self.focus_y
                .unwrap_or(bounds.top() + bounds.height() * 0.5),
        );
        let radius_y = self.radius_y.unwrap_or_else(|| match self.radius_x {
            Some(rx) if rx != 0.0 && !rx.is_nan() => rx,
            _ => bounds.height() * 0.5,
        });
        let radius_x = self.radius_x.unwrap_or(bounds.width() * 0.5);
        let center = Point::new(
            self.center_x.unwrap_or(focus.x()),
            self.center_y.unwrap_or(focus.y()),
        );
        RadialGeometry {
            focus,
            radius_x,
            radius_y,
            center,
        }
    }
}

// =============================================================================
// Image fill
// =============================================================================

/// A tiled image fill, optionally tinted between two colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFill {
    src: String,
    width: f64,
    height: f64,
    left: f64,
    top: f64,
    tint: Option<(Color, Option<Color>)>,
}

impl ImageFill {
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            src: src.into(),
            width,
            height,
            left: 0.0,
            top: 0.0,
            tint: None,
        }
    }

    /// Offsets the tile origin.
    pub fn with_offset(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Maps image luminance from `dark` to `light`. `light` defaults to
    /// `dark` at zero alpha.
    pub fn with_tint(mut self, dark: Color, light: Option<Color>) -> Self {
        self.tint = Some((dark, light));
        self
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    /// Both tint colors with the default applied.
    pub fn tint(&self) -> Option<(Color, Color)> {
        self.tint
            .map(|(dark, light)| (dark, light.unwrap_or_else(|| dark.with_alpha(0.0))))
    }

    /// The tint as given, without the default second color.
    pub fn raw_tint(&self) -> Option<(Color, Option<Color>)> {
        self.tint
    }
}

/// How a node's interior is painted.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Fill {
    #[default]
    None,
    Solid(Color),
    Linear(LinearGradient),
    Radial(RadialGradient),
    Image(ImageFill),
}

impl Fill {
    /// `Solid` for `Some`, `None` otherwise.
    pub fn from_color(color: Option<Color>) -> Self {
        color.map_or(Self::None, Self::Solid)
    }

    /// `true` for paints that need a definition element.
    pub fn needs_brush(&self) -> bool {
        matches!(self, Self::Linear(_) | Self::Radial(_) | Self::Image(_))
    }
}

// =============================================================================
// Stroke
// =============================================================================

/// How line endpoints are rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    /// Flat cap at the exact endpoint
    Butt,
    /// Rounded cap extending beyond the endpoint by half the stroke width
    #[default]
    Round,
    /// Square cap extending beyond the endpoint by half the stroke width
    Square,
}

impl StrokeCap {
    /// Returns the SVG stroke-linecap value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }

    /// Returns the VML endcap value; VML spells butt as `flat`.
    pub fn to_vml_value(&self) -> &'static str {
        match self {
            Self::Butt => "flat",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

impl FromStr for StrokeCap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" | "flat" => Ok(Self::Butt),
            "round" => Ok(Self::Round),
            "square" => Ok(Self::Square),
            _ => Err(format!(
                "invalid stroke cap `{s}`, valid values: butt, round, square"
            )),
        }
    }
}

/// How line corners are rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeJoin {
    /// Sharp corner with mitered point
    Miter,
    /// Rounded corner
    #[default]
    Round,
    /// Beveled (cut-off) corner
    Bevel,
}

impl StrokeJoin {
    /// Returns the join value; SVG and VML share the spelling.
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

impl FromStr for StrokeJoin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(Self::Miter),
            "round" => Ok(Self::Round),
            "bevel" => Ok(Self::Bevel),
            _ => Err(format!(
                "invalid stroke join `{s}`, valid values: miter, round, bevel"
            )),
        }
    }
}

/// A stroke: color, width in user units, cap and join.
///
/// The default is an invisible 1 unit stroke with round caps and joins,
/// the state every shape starts in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    color: Option<Color>,
    width: f64,
    cap: StrokeCap,
    join: StrokeJoin,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: None,
            width: 1.0,
            cap: StrokeCap::default(),
            join: StrokeJoin::default(),
        }
    }
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color: Some(color),
            width,
            ..Self::default()
        }
    }

    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: StrokeJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn cap(&self) -> StrokeCap {
        self.cap
    }

    pub fn join(&self) -> StrokeJoin {
        self.join
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }
}
