//! 2D affine transforms.
//!
//! A [`Transform`] is the 2x3 matrix `(xx, yx, xy, yy, x, y)` mapping a point
//! `(px, py)` to `(xx*px + xy*py + x, yx*px + yy*py + y)`. Every scene node
//! carries one.
//!
//! # Overview
//!
//! - [`Transform`] - The matrix value with pure composition helpers
//! - [`Transformable`] - The capability trait shared by matrices and scene nodes
//!
//! All mutating operations of [`Transformable`] funnel through
//! [`Transformable::transform_to`], so an implementor that needs to re-render
//! on change overrides that single method.
//!
//! # Examples
//!
//! ```
//! # use quill_core::geometry::Point;
//! # use quill_core::transform::{Transform, Transformable};
//! let mut t = Transform::identity();
//! t.rotate(90.0, Some(Point::new(0.0, 0.0)));
//!
//! let p = t.point(1.0, 0.0);
//! assert!(p.x().abs() < 1e-12);
//! assert!((p.y() - 1.0).abs() < 1e-12);
//! ```

use std::fmt;

use crate::geometry::{Point, Rect};

/// A 2D affine transform.
///
/// Angles used by the rotation helpers are in degrees. Degenerate matrices
/// (zero scale) are legal and NaN input propagates without error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    xx: f64,
    yx: f64,
    xy: f64,
    yy: f64,
    x: f64,
    y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Creates a transform from its six components, in `(xx, yx, xy, yy, x, y)` order.
    pub fn new(xx: f64, yx: f64, xy: f64, yy: f64, x: f64, y: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x,
            y,
        }
    }

    /// The identity transform `(1, 0, 0, 1, 0, 0)`.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// A pure translation.
    pub fn translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// A pure scale about the origin.
    pub fn scaling(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    /// A rotation about the origin by `deg` degrees.
    pub fn rotation(deg: f64) -> Self {
        let (sin, cos) = deg.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn xx(&self) -> f64 {
        self.xx
    }

    pub fn yx(&self) -> f64 {
        self.yx
    }

    pub fn xy(&self) -> f64 {
        self.xy
    }

    pub fn yy(&self) -> f64 {
        self.yy
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// The six components in `(xx, yx, xy, yy, x, y)` order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.xx, self.yx, self.xy, self.yy, self.x, self.y]
    }

    /// Returns `self ∘ m`: the composite applies `m` first, then `self`.
    ///
    /// ```
    /// # use quill_core::transform::Transform;
    /// let scale = Transform::scaling(2.0, 2.0);
    /// let shift = Transform::translation(10.0, 0.0);
    ///
    /// // shift first, then scale
    /// let p = scale.multiply(&shift).point(1.0, 1.0);
    /// assert_eq!((p.x(), p.y()), (22.0, 2.0));
    /// ```
    pub fn multiply(&self, m: &Transform) -> Transform {
        Transform::new(
            self.xx * m.xx + self.xy * m.yx,
            self.yx * m.xx + self.yy * m.yx,
            self.xx * m.xy + self.xy * m.yy,
            self.yx * m.xy + self.yy * m.yy,
            self.xx * m.x + self.xy * m.y + self.x,
            self.yx * m.x + self.yy * m.y + self.y,
        )
    }

    /// Returns a copy with the translation components replaced.
    pub fn with_translation(&self, x: f64, y: f64) -> Transform {
        Transform { x, y, ..*self }
    }

    /// Rotates by `deg` degrees around the image of the local point `pivot`.
    ///
    /// The rotation is composed on the output side of the linear part, so the
    /// pivot stays fixed while any existing scale or skew is kept.
    pub fn rotated_about(&self, deg: f64, pivot: Point) -> Transform {
        let (sin, cos) = deg.to_radians().sin_cos();
        let m = self.multiply(&Transform::translation(pivot.x(), pivot.y()));
        Transform::new(
            cos * m.xx - sin * m.yx,
            sin * m.xx + cos * m.yx,
            cos * m.xy - sin * m.yy,
            sin * m.xy + cos * m.yy,
            m.x,
            m.y,
        )
        .multiply(&Transform::translation(-pivot.x(), -pivot.y()))
    }

    /// Current rotation in degrees, corrected for reflection.
    ///
    /// The flip sign compares the shear ratios `yx/xx` and `yy/xy` and is then
    /// cross-checked against the signs of `xx` and `xy`.
    pub fn rotation_degrees(&self) -> f64 {
        let mut flip = if self.yx / self.xx > self.yy / self.xy {
            -1.0
        } else {
            1.0
        };
        if if self.xx < 0.0 {
            self.xy >= 0.0
        } else {
            self.xy < 0.0
        } {
            flip = -flip;
        }
        (flip * self.yx).atan2(flip * self.xx).to_degrees()
    }

    /// Applies the matrix to a point.
    pub fn point(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.xx * x + self.xy * y + self.x,
            self.yx * x + self.yy * y + self.y,
        )
    }

    /// Returns the inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Transform> {
        let det = self.xx * self.yy - self.yx * self.xy;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let xx = self.yy / det;
        let yx = -self.yx / det;
        let xy = -self.xy / det;
        let yy = self.xx / det;
        Some(Transform::new(
            xx,
            yx,
            xy,
            yy,
            -(xx * self.x + xy * self.y),
            -(yx * self.x + yy * self.y),
        ))
    }

    /// Returns `true` for exactly `(1, 0, 0, 1, 0, 0)`.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Renders as the SVG `matrix(xx,yx,xy,yy,x,y)` function.
impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .to_array()
            .iter()
            .map(|v| crate::geometry::format_number(*v))
            .collect();
        write!(f, "matrix({})", parts.join(","))
    }
}

/// Something that carries an affine transform.
///
/// Implementors supply [`matrix`](Self::matrix) and
/// [`transform_to`](Self::transform_to); every other operation is provided
/// and writes through `transform_to`. [`pivot`](Self::pivot) describes the
/// implementor's box, used for default rotation pivots and
/// [`resize_to`](Self::resize_to).
pub trait Transformable {
    /// The current matrix.
    fn matrix(&self) -> Transform;

    /// Replaces the matrix. This is the single mutation hook.
    fn transform_to(&mut self, matrix: Transform) -> &mut Self;

    /// The implementor's box. Components that were never set are zero.
    fn pivot(&self) -> Rect {
        Rect::default()
    }

    /// Composes `m` onto the current matrix (`m` is applied first).
    fn transform(&mut self, m: &Transform) -> &mut Self {
        let composed = self.matrix().multiply(m);
        self.transform_to(composed)
    }

    /// Composes a translation; the offset is rotated and scaled by the current matrix.
    fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.transform(&Transform::translation(x, y))
    }

    /// Adds `(x, y)` to the translation components only.
    ///
    /// Unlike [`translate`](Self::translate) the offset is in output space and
    /// ignores the current rotation and scale.
    fn move_by(&mut self, x: f64, y: f64) -> &mut Self {
        let m = self.matrix();
        self.transform_to(m.with_translation(m.x() + x, m.y() + y))
    }

    /// Sets the translation components.
    fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let m = self.matrix();
        self.transform_to(m.with_translation(x, y))
    }

    /// Composes a scale.
    fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.transform(&Transform::scaling(x, y))
    }

    /// Rotates by `deg` degrees around `pivot`, or around the center of
    /// [`pivot`](Self::pivot) when `None`.
    fn rotate(&mut self, deg: f64, pivot: Option<Point>) -> &mut Self {
        let pivot = pivot.unwrap_or_else(|| self.pivot().center());
        let rotated = self.matrix().rotated_about(deg, pivot);
        self.transform_to(rotated)
    }

    /// Rotates so the absolute rotation becomes `deg` degrees.
    fn rotate_to(&mut self, deg: f64, pivot: Option<Point>) -> &mut Self {
        let current = self.matrix().rotation_degrees();
        self.rotate(deg - current, pivot)
    }

    /// Normalizes both axes to unit length, then scales to `(x, y)`.
    fn scale_to(&mut self, x: f64, y: f64) -> &mut Self {
        let m = self.matrix();
        let h = (m.xx * m.xx + m.yx * m.yx).sqrt();
        let (xx, yx) = (m.xx / h, m.yx / h);
        let v = (m.yy * m.yy + m.xy * m.xy).sqrt();
        let (xy, yy) = (m.xy / v, m.yy / v);
        let normalized = Transform::new(xx, yx, xy, yy, m.x, m.y);
        self.transform_to(normalized.multiply(&Transform::scaling(x, y)))
    }

    /// Scales so the box reported by [`pivot`](Self::pivot) renders at
    /// `width × height`. A no-op when the box has no area.
    fn resize_to(&mut self, width: f64, height: f64) -> &mut Self {
        let pivot = self.pivot();
        if !pivot.has_area() {
            return self;
        }
        self.scale_to(width / pivot.width(), height / pivot.height())
    }
}

impl Transformable for Transform {
    fn matrix(&self) -> Transform {
        *self
    }

    fn transform_to(&mut self, matrix: Transform) -> &mut Self {
        *self = matrix;
        self
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::{approx_eq, assert_approx_eq};

    use super::*;

    fn assert_transform_eq(actual: &Transform, expected: &Transform) {
        for (a, e) in actual.to_array().iter().zip(expected.to_array()) {
            assert!(
                approx_eq!(f64, *a, e, epsilon = 1e-9),
                "{actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn test_identity_default() {
        assert!(Transform::default().is_identity());
        assert_eq!(Transform::identity().to_array(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rotate_about_origin_maps_x_axis_to_y_axis() {
        let mut t = Transform::identity();
        t.rotate(90.0, Some(Point::new(0.0, 0.0)));

        let p = t.point(1.0, 0.0);
        assert_approx_eq!(f64, p.x(), 0.0, epsilon = 1e-12);
        assert_approx_eq!(f64, p.y(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multiply_applies_argument_first() {
        let mut t = Transform::translation(10.0, 0.0);
        t.transform(&Transform::scaling(2.0, 3.0));

        let p = t.point(1.0, 1.0);
        assert_eq!((p.x(), p.y()), (12.0, 3.0));
    }

    #[test]
    fn test_translate_is_affected_by_scale() {
        let mut t = Transform::scaling(2.0, 2.0);
        t.translate(5.0, 5.0);
        assert_eq!((t.x(), t.y()), (10.0, 10.0));
    }

    #[test]
    fn test_move_by_ignores_scale_and_rotation() {
        let mut t = Transform::scaling(2.0, 2.0);
        t.rotate(45.0, Some(Point::default()));
        t.move_by(5.0, -5.0);
        assert_eq!((t.x(), t.y()), (5.0, -5.0));

        t.move_to(1.0, 2.0);
        assert_eq!((t.x(), t.y()), (1.0, 2.0));
        assert_approx_eq!(f64, t.rotation_degrees(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_default_pivot_uses_box_center() {
        struct Boxed(Transform);

        impl Transformable for Boxed {
            fn matrix(&self) -> Transform {
                self.0
            }

            fn transform_to(&mut self, matrix: Transform) -> &mut Self {
                self.0 = matrix;
                self
            }

            fn pivot(&self) -> Rect {
                Rect::new(0.0, 0.0, 10.0, 20.0)
            }
        }

        let mut node = Boxed(Transform::identity());
        node.rotate(180.0, None);

        // the center of the box stays put
        let center = node.0.point(5.0, 10.0);
        assert_approx_eq!(f64, center.x(), 5.0, epsilon = 1e-9);
        assert_approx_eq!(f64, center.y(), 10.0, epsilon = 1e-9);

        let corner = node.0.point(0.0, 0.0);
        assert_approx_eq!(f64, corner.x(), 10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, corner.y(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_without_box_uses_origin() {
        let mut t = Transform::translation(10.0, 0.0);
        t.rotate(90.0, None);

        let p = t.point(0.0, 0.0);
        assert_approx_eq!(f64, p.x(), 10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, p.y(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_to_is_absolute() {
        let mut t = Transform::identity();
        t.rotate(30.0, Some(Point::default()));
        t.rotate_to(90.0, Some(Point::default()));
        assert_approx_eq!(f64, t.rotation_degrees(), 90.0, epsilon = 1e-9);

        t.rotate_to(-45.0, Some(Point::default()));
        assert_approx_eq!(f64, t.rotation_degrees(), -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scale_to_replaces_scale() {
        let mut t = Transform::scaling(4.0, 0.5);
        t.scale_to(2.0, 3.0);
        assert_transform_eq(&t, &Transform::scaling(2.0, 3.0));
    }

    #[test]
    fn test_resize_to_without_box_is_noop() {
        let mut t = Transform::translation(3.0, 4.0);
        t.resize_to(100.0, 100.0);
        assert_eq!(t, Transform::translation(3.0, 4.0));
    }

    #[test]
    fn test_inverse_of_singular_is_none() {
        assert!(Transform::scaling(0.0, 1.0).inverse().is_none());
        assert!(Transform::scaling(2.0, 1.0).inverse().is_some());
    }

    #[test]
    fn test_nan_propagates() {
        let mut t = Transform::identity();
        t.scale(f64::NAN, 1.0);
        assert!(t.xx().is_nan());
        assert!(t.point(1.0, 0.0).x().is_nan());
    }

    #[test]
    fn test_display_matrix() {
        let t = Transform::new(1.0, 0.0, 0.0, 1.0, 10.5, -3.0);
        assert_eq!(t.to_string(), "matrix(1,0,0,1,10.5,-3)");
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn transform_strategy() -> impl Strategy<Value = Transform> {
        (
            -10.0f64..10.0,
            -10.0f64..10.0,
            -10.0f64..10.0,
            -10.0f64..10.0,
            -500.0f64..500.0,
            -500.0f64..500.0,
        )
            .prop_map(|(xx, yx, xy, yy, x, y)| Transform::new(xx, yx, xy, yy, x, y))
    }

    fn close(a: &Transform, b: &Transform, epsilon: f64) -> bool {
        a.to_array()
            .iter()
            .zip(b.to_array())
            .all(|(l, r)| approx_eq!(f64, *l, r, epsilon = epsilon))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Composing onto the identity yields the argument unchanged.
    fn check_identity_composition(m: Transform) -> Result<(), TestCaseError> {
        let mut t = Transform::identity();
        t.transform(&m);
        prop_assert_eq!(t, m);
        Ok(())
    }

    /// Composing with the inverse yields the identity.
    fn check_inverse_composition(m: Transform) -> Result<(), TestCaseError> {
        let det = m.xx() * m.yy() - m.yx() * m.xy();
        prop_assume!(det.abs() > 1e-3);

        let inverse = m.inverse().expect("non-singular");
        let mut t = m;
        t.transform(&inverse);
        prop_assert!(close(&t, &Transform::identity(), 1e-6), "{t:?}");
        Ok(())
    }

    /// `rotate_to` lands on the requested angle for any rotation combined
    /// with a positive scale.
    fn check_rotate_to_reaches_target(
        start: f64,
        target: f64,
        sx: f64,
        sy: f64,
    ) -> Result<(), TestCaseError> {
        let mut t = Transform::scaling(sx, sy);
        t.rotate(start, Some(Point::default()));
        t.rotate_to(target, Some(Point::default()));

        let measured = t.rotation_degrees();
        let diff = (measured - target).rem_euclid(360.0);
        prop_assert!(diff < 1e-6 || diff > 360.0 - 1e-6, "{measured} vs {target}");
        Ok(())
    }

    /// Rotating about a pivot keeps the pivot's image fixed.
    fn check_rotation_fixes_pivot(
        m: Transform,
        deg: f64,
        px: f64,
        py: f64,
    ) -> Result<(), TestCaseError> {
        let before = m.point(px, py);
        let after = m.rotated_about(deg, Point::new(px, py)).point(px, py);
        prop_assert!(approx_eq!(f64, before.x(), after.x(), epsilon = 1e-6));
        prop_assert!(approx_eq!(f64, before.y(), after.y(), epsilon = 1e-6));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn identity_composition(m in transform_strategy()) {
            check_identity_composition(m)?;
        }

        #[test]
        fn inverse_composition(m in transform_strategy()) {
            check_inverse_composition(m)?;
        }

        #[test]
        fn rotate_to_reaches_target(
            start in -179.0f64..179.0,
            target in -179.0f64..179.0,
            sx in 0.1f64..10.0,
            sy in 0.1f64..10.0,
        ) {
            check_rotate_to_reaches_target(start, target, sx, sy)?;
        }

        #[test]
        fn rotation_fixes_pivot(
            m in transform_strategy(),
            deg in -360.0f64..360.0,
            px in -100.0f64..100.0,
            py in -100.0f64..100.0,
        ) {
            check_rotation_fixes_pivot(m, deg, px, py)?;
        }
    }
}
