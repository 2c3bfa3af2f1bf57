//! The VML path dialect.
//!
//! Coordinates are multiplied by a precision factor and rounded to integers.
//! Circular arcs are emitted natively as `at` (counter-clockwise) or `wa`
//! (clockwise) with their bounding square, start and end points.

use super::{CircularArc, Path, PathVisitor};
use crate::geometry::{Point, format_number};

/// Rounds half up, matching the VML coordinate grid.
pub fn round_coordinate(value: f64) -> String {
    format_number((value + 0.5).floor())
}

struct VmlWriter {
    precision: f64,
    tokens: Vec<String>,
}

impl VmlWriter {
    fn push_command(&mut self, command: &str, points: &[Point]) {
        self.tokens.push(command.to_string());
        for p in points {
            self.tokens.push(round_coordinate(p.x() * self.precision));
            self.tokens.push(round_coordinate(p.y() * self.precision));
        }
    }
}

impl PathVisitor for VmlWriter {
    fn line_to(&mut self, _from: Point, to: Point) {
        self.push_command("l", &[to]);
    }

    fn curve_to(&mut self, _from: Point, c1: Point, c2: Point, to: Point) {
        self.push_command("c", &[c1, c2, to]);
    }

    fn arc_to(&mut self, arc: &CircularArc) -> bool {
        let cx = arc.center.x() * self.precision;
        let cy = arc.center.y() * self.precision;
        let r = arc.radius * self.precision;
        let command = if arc.counter_clockwise { "at" } else { "wa" };

        self.tokens.push(command.to_string());
        for v in [cx - r, cy - r, cx + r, cy + r] {
            self.tokens.push(round_coordinate(v));
        }
        for p in [arc.from, arc.to] {
            self.tokens.push(round_coordinate(p.x() * self.precision));
            self.tokens.push(round_coordinate(p.y() * self.precision));
        }
        true
    }

    fn move_to(&mut self, _from: Point, to: Point) {
        self.push_command("m", &[to]);
    }

    fn close_path(&mut self, _from: Point, _to: Point) -> bool {
        self.tokens.push("x".to_string());
        true
    }
}

pub(super) fn to_vml(path: &Path, precision: f64) -> String {
    let mut writer = VmlWriter {
        precision,
        tokens: Vec::new(),
    };
    path.visit(&mut writer);
    writer.tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_coordinate_half_up() {
        assert_eq!(round_coordinate(1.5), "2");
        assert_eq!(round_coordinate(-1.5), "-1");
        assert_eq!(round_coordinate(-0.4), "0");
        assert_eq!(round_coordinate(249.49), "249");
    }

    #[test]
    fn test_lines_and_close() {
        let mut path = Path::new();
        path.move_to(0.5, 0.25).line_by(1.0, 0.0).close();
        assert_eq!(path.to_vml(100.0), "m 50 25 l 150 25 x m 50 25");
    }

    #[test]
    fn test_curves_are_not_flattened() {
        let mut path = Path::new();
        path.curve_to(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(path.to_vml(10.0), "c 10 20 30 40 50 60");
    }

    #[test]
    fn test_quadratic_is_written_as_cubic() {
        let mut path = Path::new();
        path.quad_to(3.0, 3.0, 6.0, 0.0);
        assert_eq!(path.to_vml(1.0), "c 2 2 4 2 6 0");
    }

    #[test]
    fn test_circular_arc_clockwise_is_wa() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0).arc_to(20.0, 0.0, 10.0, 10.0, false);
        assert_eq!(path.to_vml(100.0), "m 0 0 wa 0 -1000 2000 1000 0 0 2000 0");
    }

    #[test]
    fn test_circular_arc_counter_clockwise_is_at() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0)
            .counter_arc_to(20.0, 0.0, 10.0, 10.0, false);
        assert_eq!(path.to_vml(1.0), "m 0 0 at 0 -10 20 10 0 0 20 0");
    }

    #[test]
    fn test_elliptical_arc_becomes_curves() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0).arc_to(20.0, 0.0, 10.0, 5.0, false);
        let vml = path.to_vml(1.0);
        assert!(vml.starts_with("m 0 0 c "), "{vml}");
        assert_eq!(vml.matches('c').count(), 2);
    }
}
