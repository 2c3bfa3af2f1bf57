//! Geometric primitives for scene positioning and measurement.
//!
//! This module provides the small value types shared by transforms, paths and
//! renderers.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in user space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned box defined by its edges
//! - [`Rect`] - A box defined by its top-left corner and size, as stored on nodes
//! - [`format_number`] - Markup-friendly number formatting
//!
//! # Coordinate System
//!
//! Quill uses the SVG coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Angles are measured from the +X axis towards +Y, so a positive rotation
//! turns clockwise on screen.

/// A 2D point in user space.
///
/// # Examples
///
/// ```
/// # use quill_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the Euclidean distance from the origin
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points.
    ///
    /// Computed as `sqrt(dx² + dy²)` rather than `hypot` so measurements match
    /// the flattening error term bit for bit.
    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Reflects `self` through `center`: `2 * center - self`.
    ///
    /// Used to derive the implicit control point of smooth curve commands.
    ///
    /// ```
    /// # use quill_core::geometry::Point;
    /// let control = Point::new(1.0, 2.0);
    /// let reflected = control.reflect(Point::new(3.0, 3.0));
    /// assert_eq!(reflected, Point::new(5.0, 4.0));
    /// ```
    pub fn reflect(self, center: Point) -> Self {
        Self {
            x: center.x * 2.0 - self.x,
            y: center.y * 2.0 - self.y,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned bounding box described by its four edges.
///
/// This is the shape of a path measurement: `{left, top, right, bottom}` plus
/// the derived `width` and `height`.
///
/// # Examples
///
/// ```
/// # use quill_core::geometry::Bounds;
/// let header = Bounds::new(0.0, 0.0, 100.0, 30.0);
/// let content = Bounds::new(10.0, 40.0, 130.0, 120.0);
///
/// let combined = header.merge(&content);
/// assert_eq!(combined.left(), 0.0);
/// assert_eq!(combined.width(), 130.0);
/// assert_eq!(combined.height(), 120.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Bounds {
    /// Creates bounds from their edges
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            left: top_left.x,
            top: top_left.y,
            right: top_left.x + size.width,
            bottom: top_left.y + size.height,
        }
    }

    pub fn left(self) -> f64 {
        self.left
    }

    pub fn top(self) -> f64 {
        self.top
    }

    pub fn right(self) -> f64 {
        self.right
    }

    pub fn bottom(self) -> f64 {
        self.bottom
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f64 {
        self.right - self.left
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f64 {
        self.bottom - self.top
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Converts bounds to a [`Rect`] anchored at the top-left corner
    pub fn to_rect(self) -> Rect {
        Rect::new(self.left, self.top, self.width(), self.height())
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Returns `true` when `other` lies entirely within `self` (edges inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            left: self.left + offset.x,
            top: self.top + offset.y,
            right: self.right + offset.x,
            bottom: self.bottom + offset.y,
        }
    }
}

/// A box given by its top-left corner and its size.
///
/// Nodes record their geometry this way (`left`, `top`, `width`, `height`);
/// it is the box used for default rotation pivots, `resize_to` and gradient
/// defaults. Components a node never set are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A box at the origin with the given size
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn left(self) -> f64 {
        self.left
    }

    pub fn top(self) -> f64 {
        self.top
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    /// The center of the box, used as the default rotation pivot.
    pub fn center(self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Returns `true` when both dimensions are nonzero.
    pub fn has_area(self) -> bool {
        self.width != 0.0 && self.height != 0.0
    }

    pub fn to_bounds(self) -> Bounds {
        Bounds::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }
}

/// Formats a number for markup output.
///
/// Integral values print without a fractional part, `-0` prints as `0`, and
/// non-finite values use the spellings browsers accept in attribute values.
///
/// ```
/// # use quill_core::geometry::format_number;
/// assert_eq!(format_number(10.0), "10");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(0.25), "0.25");
/// assert_eq!(format_number(f64::INFINITY), "Infinity");
/// ```
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}
