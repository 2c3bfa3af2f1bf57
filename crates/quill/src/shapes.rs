//! Path builders for common shapes.
//!
//! Every builder returns a [`Path`] whose box starts at the origin, so the
//! node's `(0, 0, width, height)` box matches the drawn geometry.
//! [`RendererHandle`](crate::RendererHandle) wraps each of them in a
//! `make_*` constructor.

use std::f64::consts::{PI, TAU};

use quill_core::path::Path;

/// Corner radii of a rectangle, clockwise from the top left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Corners {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl Corners {
    pub fn new(top_left: f64, top_right: f64, bottom_right: f64, bottom_left: f64) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// The same radius on every corner.
    pub fn uniform(radius: f64) -> Self {
        Self::new(radius, radius, radius, radius)
    }

    fn is_square(&self) -> bool {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
        .iter()
        .all(|r| *r == 0.0 || r.is_nan())
    }
}

impl From<f64> for Corners {
    fn from(radius: f64) -> Self {
        Self::uniform(radius)
    }
}

/// A rectangle with optionally rounded corners.
///
/// Negative radii count as zero. A negative width or height draws the
/// rectangle on the other side of the origin.
pub fn rectangle(width: f64, height: f64, radius: impl Into<Corners>) -> Path {
    let radius = radius.into();
    let mut path = Path::new();
    if radius.is_square() {
        path.move_by(0.0, 0.0)
            .line_by(width, 0.0)
            .line_by(0.0, height)
            .line_by(-width, 0.0)
            .line_by(0.0, -height)
            .close();
        return path;
    }

    let clamp = |r: f64| if r.is_nan() { 0.0 } else { r.max(0.0) };
    let tl = clamp(radius.top_left);
    let tr = clamp(radius.top_right);
    let br = clamp(radius.bottom_right);
    let bl = clamp(radius.bottom_left);
    let (w, h) = (width.abs(), height.abs());

    path.move_by(0.0, tl);
    if width < 0.0 {
        path.move_by(width, 0.0);
    }
    if height < 0.0 {
        path.move_by(0.0, height);
    }

    if tl > 0.0 {
        path.arc_by(tl, -tl, tl, tl, false);
    }
    path.line_by(w - (tr + tl), 0.0);
    if tr > 0.0 {
        path.arc_by(tr, tr, tr, tr, false);
    }
    path.line_by(0.0, h - (tr + br));
    if br > 0.0 {
        path.arc_by(-br, br, br, br, false);
    }
    path.line_by(-w + (br + bl), 0.0);
    if bl > 0.0 {
        path.arc_by(-bl, -bl, bl, bl, false);
    }
    path.line_by(0.0, -h + (bl + tl));
    path.close();
    path
}

/// A rectangle whose shorter sides are half circles.
pub fn pill(width: f64, height: f64) -> Path {
    rectangle(width, height, width.min(height) / 2.0)
}

/// An ellipse inscribed in `width × height`.
pub fn ellipse(width: f64, height: f64) -> Path {
    let (rx, ry) = (width / 2.0, height / 2.0);
    let mut path = Path::new();
    path.move_by(0.0, ry)
        .arc_by(width, 0.0, rx, ry, false)
        .arc_by(-width, 0.0, rx, ry, false)
        .close();
    path
}

/// A circle of radius `radius` inscribed in `2r × 2r`.
pub fn circle(radius: f64) -> Path {
    ellipse(radius * 2.0, radius * 2.0)
}

/// A ring segment between two radii, from `start` to `end` degrees.
///
/// Angles run clockwise from twelve o'clock. The radii may be given in any
/// order; an inner radius of zero draws a pie slice. A sweep of 360 degrees
/// or more draws a full ring.
pub fn wedge(inner_radius: f64, outer_radius: f64, start: f64, end: f64) -> Path {
    let inner = inner_radius.min(outer_radius);
    let outer = inner_radius.max(outer_radius);
    let mut path = Path::new();

    if (end - start).abs() >= 360.0 {
        path.move_by(0.0, outer)
            .arc_by(outer * 2.0, 0.0, outer, outer, false)
            .arc_by(-outer * 2.0, 0.0, outer, outer, false);
        if inner > 0.0 {
            path.move_by(outer - inner, 0.0)
                .counter_arc_by(inner * 2.0, 0.0, inner, inner, false)
                .counter_arc_by(-inner * 2.0, 0.0, inner, inner, false);
        }
        path.close();
        return path;
    }

    let normalize = |deg: f64| {
        let rad = deg.to_radians() % TAU;
        if rad.is_nan() { 0.0 } else { rad }
    };
    let start = normalize(start);
    let end = normalize(end);
    let sweep = if start > end {
        TAU - start + end
    } else {
        end - start
    };
    let large = sweep > PI;

    let (ss, sc) = start.sin_cos();
    let (es, ec) = end.sin_cos();
    let (ds, dc) = (es - ss, ec - sc);
    let dr = inner - outer;

    path.move_by(outer + outer * ss, outer - outer * sc)
        .arc_by(outer * ds, -outer * dc, outer, outer, large)
        .line_by(dr * es, -dr * ec);
    if inner > 0.0 {
        path.counter_arc_by(-inner * ds, inner * dc, inner, inner, large);
    }
    path.close();
    path
}

/// An isosceles triangle standing on its base.
pub fn triangle(base: f64, height: f64) -> Path {
    let mut path = Path::new();
    path.move_by(0.0, height)
        .line_by(base, 0.0)
        .line_by(-base / 2.0, -height)
        .line_by(-base / 2.0, height)
        .close();
    path
}

/// A star with `points` tips centered on the origin.
///
/// Without an inner radius the star uses `0.45 × outer`. The first tip points
/// up.
pub fn star(outer_radius: f64, inner_radius: Option<f64>, points: usize) -> Path {
    let inner = inner_radius.unwrap_or(outer_radius * 0.45);
    let points = points.max(2);
    let step = TAU / points as f64;
    let start = 270f64.to_radians();

    let mut path = Path::new();
    path.move_to(outer_radius * start.cos(), outer_radius * start.sin());
    for i in 0..points {
        let i = i as f64;
        let valley = step * (i + 0.5) + start;
        let tip = step * (i + 1.0) + start;
        path.line_to(inner * valley.cos(), inner * valley.sin())
            .line_to(outer_radius * tip.cos(), outer_radius * tip.sin());
    }
    path.close();
    path
}
