//! Error types for toolpath tessellation.

use thiserror::Error;

use crate::corner::Corner;

/// Result type for toolpath tessellation.
pub type TessellateResult<T> = Result<T, TessellateError>;

/// Errors that can occur while tessellating toolpaths.
///
/// Input is fully validated before anything is written, so an error
/// leaves the output geometry unchanged.
#[derive(Debug, Error)]
pub enum TessellateError {
    /// A per-segment array does not match the segment count.
    #[error("{field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the mismatched array.
        field: &'static str,
        /// Number of segments.
        expected: usize,
        /// Actual array length.
        actual: usize,
    },

    /// Segment is too short (or not finite) to define a direction.
    #[error("degenerate segment at index {index}")]
    DegenerateSegment {
        /// Index of the degenerate segment.
        index: usize,
    },

    /// Width is zero, negative or not finite.
    #[error("invalid width {value} at segment {index}")]
    InvalidWidth {
        /// Index of the segment.
        index: usize,
        /// Offending width.
        value: f64,
    },

    /// Height is zero, negative or not finite.
    #[error("invalid height {value} at segment {index}")]
    InvalidHeight {
        /// Index of the segment.
        index: usize,
        /// Offending height.
        value: f64,
    },

    /// Layer elevation is not finite.
    #[error("invalid top elevation: {0}")]
    InvalidElevation(f64),

    /// Closed run whose last segment does not end at the first segment's start.
    #[error("closed toolpath does not close, gap is {gap}")]
    UnclosedLoop {
        /// Distance between the last end point and the first start point.
        gap: f64,
    },

    /// The appended vertices could not be addressed with `u32` indices.
    #[error("toolpath needs up to {required} vertices, beyond the u32 index range")]
    IndexOverflow {
        /// Worst-case vertex count after appending.
        required: u64,
    },

    /// A corner index was used before it was allocated.
    #[error("corner {0:?} was never allocated")]
    UnresolvedCorner(Corner),
}
