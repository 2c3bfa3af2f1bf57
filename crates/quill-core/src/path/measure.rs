//! Bounds, length and arclength queries over a replayed path.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::{CircularArc, Path, PathVisitor};
use crate::{
    geometry::{Bounds, Point},
    transform::Transform,
};

// Compass angles in screen space, where +Y points down
const WEST: f64 = PI;
const SOUTH: f64 = FRAC_PI_2;
const NORTH: f64 = -FRAC_PI_2;
const EAST: f64 = 0.0;

struct BoundsVisitor {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl BoundsVisitor {
    fn new() -> Self {
        Self {
            left: f64::INFINITY,
            top: f64::INFINITY,
            right: f64::NEG_INFINITY,
            bottom: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, points: &[Point]) {
        for p in points {
            self.left = self.left.min(p.x());
            self.right = self.right.max(p.x());
            self.top = self.top.min(p.y());
            self.bottom = self.bottom.max(p.y());
        }
    }

    fn finish(self) -> Bounds {
        if self.left == f64::INFINITY {
            Bounds::default()
        } else {
            Bounds::new(self.left, self.top, self.right, self.bottom)
        }
    }
}

impl PathVisitor for BoundsVisitor {
    fn line_to(&mut self, from: Point, to: Point) {
        self.include(&[from, to]);
    }

    fn curve_to(&mut self, from: Point, c1: Point, c2: Point, to: Point) {
        self.include(&[from, c1, c2, to]);
    }

    /// Extends to the circle's extreme in every compass direction the arc
    /// sweeps through.
    fn arc_to(&mut self, arc: &CircularArc) -> bool {
        let (sa, mut ea) = if arc.counter_clockwise {
            (arc.end_angle, arc.start_angle)
        } else {
            (arc.start_angle, arc.end_angle)
        };
        if ea < sa {
            ea += TAU;
        }

        let (c, r, end) = (arc.center, arc.radius, arc.to);
        let left = if ea > WEST { c.x() - r } else { end.x() };
        let right = if ea > TAU + EAST || (sa < EAST && ea > EAST) {
            c.x() + r
        } else {
            end.x()
        };
        let top = if ea > TAU + NORTH || (sa < NORTH && ea > NORTH) {
            c.y() - r
        } else {
            end.y()
        };
        let bottom = if ea > TAU + SOUTH || (sa < SOUTH && ea > SOUTH) {
            c.y() + r
        } else {
            end.y()
        };

        self.include(&[arc.from, Point::new(left, top), Point::new(right, bottom)]);
        true
    }
}

pub(super) fn bounds(path: &Path) -> Bounds {
    let mut visitor = BoundsVisitor::new();
    path.visit(&mut visitor);
    visitor.finish()
}

struct LengthVisitor(f64);

impl PathVisitor for LengthVisitor {
    fn line_to(&mut self, from: Point, to: Point) {
        self.0 += from.distance(to);
    }
}

pub(super) fn length(path: &Path) -> f64 {
    let mut visitor = LengthVisitor(0.0);
    path.visit(&mut visitor);
    visitor.0
}

/// Walks flattened segments until the accumulated length reaches `desired`.
struct TraverseVisitor {
    length: f64,
    desired: f64,
    found: Option<Transform>,
}

impl PathVisitor for TraverseVisitor {
    fn line_to(&mut self, from: Point, to: Point) {
        if self.found.is_some() {
            return;
        }
        let (dx, dy) = (to.x() - from.x(), to.y() - from.y());
        let l = (dx * dx + dy * dy).sqrt();
        if l == 0.0 {
            return;
        }
        self.length += l;
        if self.length >= self.desired {
            let offset = (self.length - self.desired) / l;
            let (cos, sin) = (dx / l, dy / l);
            self.found = Some(Transform::new(
                cos,
                sin,
                -sin,
                cos,
                to.x() - dx * offset,
                to.y() - dy * offset,
            ));
        }
    }
}

pub(super) fn point_at(path: &Path, desired: f64) -> Option<Transform> {
    let mut visitor = TraverseVisitor {
        length: 0.0,
        desired,
        found: None,
    };
    path.visit(&mut visitor);
    visitor.found
}
