//! Thick toolpath input: segments plus per-segment cross-section.

use crate::line::{Line2, Line3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered run of segments with an extrusion width and height per segment.
///
/// `widths[i]` and `heights[i]` describe the cross-section of `lines[i]`.
/// A closed run continues from the end of its last segment back into the
/// first one.
///
/// # Example
///
/// ```
/// use preview_types::{Line2, PlanarLines, Point2};
///
/// let mut run = PlanarLines::open();
/// run.push(Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)), 0.45, 0.2);
/// run.push(Line2::new(Point2::new(10.0, 0.0), Point2::new(10.0, 5.0)), 0.45, 0.2);
///
/// assert_eq!(run.len(), 2);
/// assert!(!run.closed);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThickLines<L> {
    /// Segments in travel order.
    pub lines: Vec<L>,
    /// Cross-section width of each segment.
    pub widths: Vec<f64>,
    /// Cross-section height of each segment.
    pub heights: Vec<f64>,
    /// Whether the run is a closed loop.
    pub closed: bool,
}

/// Segments confined to one layer plane.
pub type PlanarLines = ThickLines<Line2>;

/// Segments in free 3D space.
pub type SpatialLines = ThickLines<Line3>;

impl<L> ThickLines<L> {
    /// Create an empty open run.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            lines: Vec::new(),
            widths: Vec::new(),
            heights: Vec::new(),
            closed: false,
        }
    }

    /// Create an empty closed run.
    #[must_use]
    pub const fn closed() -> Self {
        Self {
            lines: Vec::new(),
            widths: Vec::new(),
            heights: Vec::new(),
            closed: true,
        }
    }

    /// Create a run where every segment shares one width and height.
    #[must_use]
    pub fn uniform(lines: Vec<L>, width: f64, height: f64, closed: bool) -> Self {
        let n = lines.len();
        Self {
            lines,
            widths: vec![width; n],
            heights: vec![height; n],
            closed,
        }
    }

    /// Append a segment with its cross-section.
    pub fn push(&mut self, line: L, width: f64, height: f64) {
        self.lines.push(line);
        self.widths.push(width);
        self.heights.push(height);
    }

    /// Append all segments of `lines` with a shared cross-section.
    pub fn extend_uniform(&mut self, lines: impl IntoIterator<Item = L>, width: f64, height: f64) {
        for line in lines {
            self.push(line, width, height);
        }
    }

    /// Number of segments.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when there are no segments.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl PlanarLines {
    /// Lift every segment to elevation `z`, keeping widths, heights and closedness.
    #[must_use]
    pub fn at_z(&self, z: f64) -> SpatialLines {
        SpatialLines {
            lines: self.lines.iter().map(|line| line.at_z(z)).collect(),
            widths: self.widths.clone(),
            heights: self.heights.clone(),
            closed: self.closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn segment(x0: f64, x1: f64) -> Line2 {
        Line2::new(Point2::new(x0, 0.0), Point2::new(x1, 0.0))
    }

    #[test]
    fn uniform_repeats_cross_section() {
        let run = PlanarLines::uniform(vec![segment(0.0, 1.0), segment(1.0, 2.0)], 0.4, 0.2, false);
        assert_eq!(run.widths, vec![0.4, 0.4]);
        assert_eq!(run.heights, vec![0.2, 0.2]);
    }

    #[test]
    fn push_keeps_arrays_parallel() {
        let mut run = PlanarLines::closed();
        run.push(segment(0.0, 1.0), 0.4, 0.2);
        run.extend_uniform([segment(1.0, 2.0), segment(2.0, 3.0)], 0.5, 0.3);
        assert_eq!(run.len(), 3);
        assert_eq!(run.widths.len(), 3);
        assert_eq!(run.heights, vec![0.2, 0.3, 0.3]);
        assert!(run.closed);
    }

    #[test]
    fn at_z_preserves_everything_but_dimension() {
        let run = PlanarLines::uniform(vec![segment(0.0, 1.0)], 0.4, 0.2, true);
        let lifted = run.at_z(1.5);
        assert_eq!(lifted.len(), 1);
        assert!(lifted.closed);
        assert!((lifted.lines[0].a.z - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_run() {
        let run: SpatialLines = ThickLines::open();
        assert!(run.is_empty());
    }
}
