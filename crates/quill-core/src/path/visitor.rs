//! Path replay.
//!
//! [`replay`] walks the segment list once, resolving relative coordinates,
//! smooth control reflection, quadratic elevation and arc conversion, and
//! reports everything to a [`PathVisitor`] in absolute coordinates.

use std::f64::consts::{FRAC_PI_2, TAU};

use super::{ArcParams, Command, Segment};
use crate::geometry::Point;

/// Flattening stops once a curve's control polygon is this close to its chord.
const FLATNESS: f64 = 0.0001;

/// Maximum recursion depth of [`flatten_curve`].
const MAX_FLATTEN_DEPTH: u32 = 16;

/// A circular arc in absolute coordinates.
///
/// Angles are in radians, measured from the +X axis towards +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub from: Point,
    pub to: Point,
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub counter_clockwise: bool,
}

/// Callbacks driven by [`Path::visit`](super::Path::visit).
///
/// Only [`line_to`](Self::line_to) is required. The defaults flatten curves
/// into lines, decline native arcs and close subpaths with a line back to
/// their start.
pub trait PathVisitor {
    fn line_to(&mut self, from: Point, to: Point);

    /// A cubic Bézier. Flattens into [`line_to`](Self::line_to) by default.
    fn curve_to(&mut self, from: Point, c1: Point, c2: Point, to: Point) {
        flatten_curve(from, c1, c2, to, &mut |a, b| self.line_to(a, b));
    }

    /// Offers a circular arc. Return `true` when handled, `false` to receive
    /// it as cubic curves instead.
    fn arc_to(&mut self, _arc: &CircularArc) -> bool {
        false
    }

    fn move_to(&mut self, _from: Point, _to: Point) {}

    /// Closes the subpath that started at `to`.
    ///
    /// The default draws a line back to the start and returns `false`. A
    /// visitor that closes natively returns `true` and then receives a
    /// [`move_to`](Self::move_to) back to the start.
    fn close_path(&mut self, from: Point, to: Point) -> bool {
        self.line_to(from, to);
        false
    }
}

/// Flattens a cubic Bézier into line segments by recursive bisection.
///
/// A piece is emitted as a line once the length of its control polygon
/// exceeds its chord by at most `0.0001`, or after 16 levels of subdivision.
/// Non-finite input terminates immediately with a single line.
pub fn flatten_curve(
    from: Point,
    c1: Point,
    c2: Point,
    to: Point,
    line_to: &mut dyn FnMut(Point, Point),
) {
    flatten_at_depth(from, c1, c2, to, line_to, 0);
}

fn flatten_at_depth(
    from: Point,
    c1: Point,
    c2: Point,
    to: Point,
    line_to: &mut dyn FnMut(Point, Point),
    depth: u32,
) {
    let err = from.distance(c1) + c1.distance(c2) + c2.distance(to) - to.distance(from);
    // NaN fails the comparison and ends the recursion
    if !(err > FLATNESS) || depth >= MAX_FLATTEN_DEPTH {
        line_to(from, to);
        return;
    }

    let mid = c1.midpoint(c2);
    let l1 = from.midpoint(c1);
    let l2 = l1.midpoint(mid);
    let r2 = c2.midpoint(to);
    let r1 = mid.midpoint(r2);
    let split = l2.midpoint(r1);

    flatten_at_depth(from, l1, l2, split, line_to, depth + 1);
    flatten_at_depth(split, r1, r2, to, line_to, depth + 1);
}

/// Replays `segments` into `visitor`.
///
/// Commands before the first move draw from the origin. A close with no open
/// subpath is ignored, and a move starts a new subpath.
pub(super) fn replay<V: PathVisitor + ?Sized>(segments: &[Segment], visitor: &mut V) {
    let mut current = Point::default();
    // Last control point, reflected by smooth commands
    let mut control = Point::default();
    let mut start: Option<Point> = None;

    for segment in segments {
        let base = if segment.is_relative() {
            current
        } else {
            Point::default()
        };
        let command = segment.command();

        if !matches!(command, Command::Move(_) | Command::Close) && start.is_none() {
            start = Some(current);
        }

        match *command {
            Command::Move(p) => {
                let to = base.add_point(p);
                visitor.move_to(current, to);
                current = to;
                start = None;
            }
            Command::Line(p) => {
                let to = base.add_point(p);
                visitor.line_to(current, to);
                current = to;
            }
            Command::Horizontal(x) => {
                let to = Point::new(base.x() + x, current.y());
                visitor.line_to(current, to);
                current = to;
            }
            Command::Vertical(y) => {
                let to = Point::new(current.x(), base.y() + y);
                visitor.line_to(current, to);
                current = to;
            }
            Command::Cubic { c1, c2, to } => {
                control = base.add_point(c2);
                let to = base.add_point(to);
                visitor.curve_to(current, base.add_point(c1), control, to);
                current = to;
            }
            Command::SmoothCubic { c2, to } => {
                let c1 = control.reflect(current);
                control = base.add_point(c2);
                let to = base.add_point(to);
                visitor.curve_to(current, c1, control, to);
                current = to;
            }
            Command::Quadratic { control: q, to } => {
                control = base.add_point(q);
                let to = base.add_point(to);
                quadratic(visitor, current, control, to);
                current = to;
            }
            Command::SmoothQuadratic(to) => {
                control = control.reflect(current);
                let to = base.add_point(to);
                quadratic(visitor, current, control, to);
                current = to;
            }
            Command::Arc(arc) => {
                let to = base.add_point(arc.to);
                if is_degenerate_radius(arc.rx) || is_degenerate_radius(arc.ry) || to == current {
                    visitor.line_to(current, to);
                } else {
                    visit_arc(visitor, &arc, current, to);
                }
                current = to;
            }
            Command::Close => {
                if let Some(start) = start.take() {
                    if visitor.close_path(current, start) {
                        visitor.move_to(current, start);
                    }
                    current = start;
                }
            }
        }

        if !matches!(
            command,
            Command::Cubic { .. }
                | Command::SmoothCubic { .. }
                | Command::Quadratic { .. }
                | Command::SmoothQuadratic(_)
        ) {
            control = current;
        }
    }
}

fn is_degenerate_radius(radius: f64) -> bool {
    radius == 0.0 || radius.is_nan()
}

/// Elevates a quadratic to a cubic.
fn quadratic<V: PathVisitor + ?Sized>(visitor: &mut V, from: Point, q: Point, to: Point) {
    let third = |p: Point| Point::new((p.x() + q.x() * 2.0) / 3.0, (p.y() + q.y() * 2.0) / 3.0);
    let (c1, c2) = (third(from), third(to));
    visitor.curve_to(from, c1, c2, to);
}

/// Converts an endpoint-parameterized arc to its center form and reports it.
///
/// Radii too small to span the endpoints are scaled up until they do.
fn visit_arc<V: PathVisitor + ?Sized>(visitor: &mut V, arc: &ArcParams, from: Point, to: Point) {
    let (sin, cos) = arc.rotation.to_radians().sin_cos();
    let (mut rx, mut ry) = (arc.rx.abs(), arc.ry.abs());
    let x = to.x() - from.x();
    let y = to.y() - from.y();

    let mut cx = cos * x / 2.0 + sin * y / 2.0;
    let mut cy = -sin * x / 2.0 + cos * y / 2.0;
    let rxry = rx * rx * ry * ry;
    let rycx = ry * ry * cx * cx;
    let rxcy = rx * rx * cy * cy;
    let a = rxry - rxcy - rycx;

    if a < 0.0 {
        let scale = (1.0 - a / rxry).sqrt();
        rx *= scale;
        ry *= scale;
        cx = x / 2.0;
        cy = y / 2.0;
    } else {
        let mut a = (a / (rxcy + rycx)).sqrt();
        if arc.large_arc == arc.sweep {
            a = -a;
        }
        let cxd = -a * cy * rx / ry;
        let cyd = a * cx * ry / rx;
        cx = cos * cxd - sin * cyd + x / 2.0;
        cy = sin * cxd + cos * cyd + y / 2.0;
    }

    // Unit circle space
    let (xx, yx) = (cos / rx, sin / rx);
    let (xy, yy) = (-sin / ry, cos / ry);
    let start_angle = (xy * -cx + yy * -cy).atan2(xx * -cx + yx * -cy);
    let end_angle = (xy * (x - cx) + yy * (y - cy)).atan2(xx * (x - cx) + yx * (y - cy));

    let center = Point::new(cx + from.x(), cy + from.y());

    if rx == ry {
        // Angles above are relative to the rotated axis
        let screen = |angle: f64| {
            let (sin, cos) = (angle + arc.rotation.to_radians()).sin_cos();
            sin.atan2(cos)
        };
        let circular = CircularArc {
            from,
            to,
            center,
            radius: rx,
            start_angle: screen(start_angle),
            end_angle: screen(end_angle),
            counter_clockwise: !arc.sweep,
        };
        if visitor.arc_to(&circular) {
            return;
        }
    }

    // Back to user space
    let (xx, yx) = (cos * rx, -sin * ry);
    let (xy, yy) = (sin * rx, cos * ry);

    let mut sweep = end_angle - start_angle;
    if sweep < 0.0 && arc.sweep {
        sweep += TAU;
    } else if sweep > 0.0 && !arc.sweep {
        sweep -= TAU;
    }

    let n = (sweep / FRAC_PI_2).abs().ceil() as usize;
    let step = sweep / n as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();
    let to_user = |ux: f64, uy: f64| {
        Point::new(
            center.x() + xx * ux + yx * uy,
            center.y() + xy * ux + yy * uy,
        )
    };

    let mut angle = start_angle;
    let mut current = from;
    let (mut ux, mut uy) = (angle.cos(), angle.sin());
    for _ in 0..n {
        let c1 = to_user(ux - k * uy, uy + k * ux);
        angle += step;
        ux = angle.cos();
        uy = angle.sin();
        let c2 = to_user(ux + k * uy, uy - k * ux);
        let end = to_user(ux, uy);
        visitor.curve_to(current, c1, c2, end);
        current = end;
    }
}
