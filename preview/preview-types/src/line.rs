//! Toolpath segment types.

use nalgebra::{Point2, Point3, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A planar toolpath segment from `a` to `b`.
///
/// Planar segments belong to a single layer; the elevation is supplied
/// separately as the layer's top Z.
///
/// # Example
///
/// ```
/// use preview_types::{Line2, Point2};
///
/// let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
/// assert!((line.length() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line2 {
    /// Start point.
    pub a: Point2<f64>,
    /// End point.
    pub b: Point2<f64>,
}

impl Line2 {
    /// Create a segment between two points.
    #[inline]
    #[must_use]
    pub const fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self { a, b }
    }

    /// Vector from `a` to `b`.
    #[inline]
    #[must_use]
    pub fn vector(&self) -> Vector2<f64> {
        self.b - self.a
    }

    /// Segment length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Copy of the segment moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector2<f64>) -> Self {
        Self::new(self.a + offset, self.b + offset)
    }

    /// Lift the segment to 3D at elevation `z`.
    #[must_use]
    pub fn at_z(&self, z: f64) -> Line3 {
        Line3::new(
            Point3::new(self.a.x, self.a.y, z),
            Point3::new(self.b.x, self.b.y, z),
        )
    }
}

/// A spatial toolpath segment from `a` to `b`.
///
/// Used for G-code preview where moves are not confined to a layer plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line3 {
    /// Start point.
    pub a: Point3<f64>,
    /// End point.
    pub b: Point3<f64>,
}

impl Line3 {
    /// Create a segment between two points.
    #[inline]
    #[must_use]
    pub const fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self { a, b }
    }

    /// Vector from `a` to `b`.
    #[inline]
    #[must_use]
    pub fn vector(&self) -> Vector3<f64> {
        self.b - self.a
    }

    /// Segment length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// True when the segment has no horizontal extent.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.a.x == self.b.x && self.a.y == self.b.y
    }
}
