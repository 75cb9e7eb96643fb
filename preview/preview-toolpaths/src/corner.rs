//! Corner bookkeeping and turn classification.

use nalgebra::{Point3, Vector3};
use preview_types::Geometry;

use crate::config::TessellationConfig;
use crate::error::{TessellateError, TessellateResult};
use crate::frame::CrossSection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four corners of a cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Corner {
    /// Highest point of the cross-section.
    Top,
    /// Lowest point of the cross-section.
    Bottom,
    /// Left of the direction of travel.
    Left,
    /// Right of the direction of travel.
    Right,
}

impl Corner {
    /// All corners, in allocation order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Position in [`Corner::ALL`].
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// The four lateral faces as `(from, to)` corner pairs.
///
/// A face between boundaries `a` and `b` is the quad
/// `a.from, b.from, b.to, a.to`, wound outward.
pub(crate) const FACES: [(Corner, Corner); 4] = [
    (Corner::Bottom, Corner::Right),
    (Corner::Right, Corner::Top),
    (Corner::Top, Corner::Left),
    (Corner::Left, Corner::Bottom),
];

/// Vertex indices of the corners at one boundary, possibly incomplete.
///
/// `None` marks a corner whose vertex has not been allocated yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CornerIndices {
    pub top: Option<u32>,
    pub bottom: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl CornerIndices {
    pub(crate) const fn get(&self, corner: Corner) -> Option<u32> {
        match corner {
            Corner::Top => self.top,
            Corner::Bottom => self.bottom,
            Corner::Left => self.left,
            Corner::Right => self.right,
        }
    }

    pub(crate) fn set(&mut self, corner: Corner, index: Option<u32>) {
        match corner {
            Corner::Top => self.top = index,
            Corner::Bottom => self.bottom = index,
            Corner::Left => self.left = index,
            Corner::Right => self.right = index,
        }
    }

    /// Allocate every missing corner in [`Corner::ALL`] order, placed by `place`.
    pub(crate) fn allocate_missing(
        &mut self,
        geometry: &mut Geometry,
        place: impl Fn(Corner) -> (Point3<f64>, Vector3<f64>),
    ) {
        for corner in Corner::ALL {
            if self.get(corner).is_none() {
                let (position, normal) = place(corner);
                self.set(corner, Some(geometry.push_geometry(position, normal)));
            }
        }
    }

    /// Check that every corner is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`TessellateError::UnresolvedCorner`] naming the first missing corner.
    pub(crate) fn resolve(&self) -> TessellateResult<ResolvedCorners> {
        let get = |corner| self.get(corner).ok_or(TessellateError::UnresolvedCorner(corner));
        Ok(ResolvedCorners {
            top: get(Corner::Top)?,
            bottom: get(Corner::Bottom)?,
            left: get(Corner::Left)?,
            right: get(Corner::Right)?,
        })
    }
}

/// Vertex indices of all four corners at one boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedCorners {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl ResolvedCorners {
    pub(crate) const fn get(&self, corner: Corner) -> u32 {
        match corner {
            Corner::Top => self.top,
            Corner::Bottom => self.bottom,
            Corner::Left => self.left,
            Corner::Right => self.right,
        }
    }
}

/// How the tube bends at a boundary between two segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The segments are collinear; corners carry straight through.
    Straight,
    /// Corners are shared across the boundary with blended normals.
    Smooth,
    /// Corners on the outside of the bend are split so each segment keeps
    /// its own normals.
    Sharp,
}

/// Classify the join from `prev` into `next`.
///
/// A join is sharp when the tangents diverge past
/// [`TessellationConfig::sharp_turn_cos`] or either segment is longer than
/// [`TessellationConfig::long_segment_length`]. Joins within
/// [`TessellationConfig::collinear_tolerance`] of collinear are straight.
///
/// # Example
///
/// ```
/// use preview_toolpaths::{CrossSection, TessellationConfig, Turn, classify_turn};
/// use preview_types::{Line2, Point2};
///
/// let east = Line2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
/// let north = Line2::new(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));
/// let a = CrossSection::planar(&east, 0.2, 0.4, 0.2);
/// let b = CrossSection::planar(&north, 0.2, 0.4, 0.2);
///
/// assert_eq!(classify_turn(&a, &b, &TessellationConfig::default()), Turn::Sharp);
/// ```
#[must_use]
pub fn classify_turn(
    prev: &CrossSection,
    next: &CrossSection,
    config: &TessellationConfig,
) -> Turn {
    let dot = prev.tangent.dot(&next.tangent);
    if 1.0 - dot < config.collinear_tolerance {
        return Turn::Straight;
    }

    let sharp = dot < config.sharp_turn_cos
        || prev.length > config.long_segment_length
        || next.length > config.long_segment_length;
    if sharp { Turn::Sharp } else { Turn::Smooth }
}
