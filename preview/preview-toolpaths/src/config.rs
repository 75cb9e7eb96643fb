//! Tessellation and preview loading parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters controlling how joins between segments are tessellated.
///
/// # Presets
///
/// - [`TessellationConfig::default()`] - shared vertices up to 45° turns on short segments
/// - [`TessellationConfig::faceted()`] - every bend gets its own normals
/// - [`TessellationConfig::smooth()`] - only the angle decides, segment length is ignored
///
/// # Example
///
/// ```
/// use preview_toolpaths::TessellationConfig;
///
/// let config = TessellationConfig::default()
///     .with_sharp_turn_cos(0.9)
///     .with_long_segment_length(5.0);
///
/// assert!((config.sharp_turn_cos - 0.9).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TessellationConfig {
    /// A join is sharp when the dot product of the two unit tangents is below this.
    ///
    /// Default: 0.707 (45°)
    pub sharp_turn_cos: f64,

    /// A join is sharp when either adjacent segment is longer than this (mm).
    ///
    /// Long segments spread an averaged normal over a large area, which
    /// shades badly.
    ///
    /// Default: 2.5
    pub long_segment_length: f64,

    /// Joins with `1 - dot` below this are collinear and always share vertices.
    ///
    /// Default: 1e-9
    pub collinear_tolerance: f64,

    /// Segments shorter than this are rejected as degenerate (mm).
    ///
    /// Default: 1e-9
    pub min_segment_length: f64,

    /// Height or endpoint differences above this start a new tube section (mm).
    ///
    /// Default: 1e-9
    pub elevation_tolerance: f64,

    /// Largest accepted gap between the end of a closed run and its start (mm).
    ///
    /// Default: 1e-6
    pub closure_tolerance: f64,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            sharp_turn_cos: 0.707,
            long_segment_length: 2.5,
            collinear_tolerance: 1e-9,
            min_segment_length: 1e-9,
            elevation_tolerance: 1e-9,
            closure_tolerance: 1e-6,
        }
    }
}

impl TessellationConfig {
    /// Every non-collinear join is sharp.
    #[must_use]
    pub fn faceted() -> Self {
        Self {
            sharp_turn_cos: 1.0,
            ..Self::default()
        }
    }

    /// Joins are classified by angle only.
    #[must_use]
    pub fn smooth() -> Self {
        Self {
            long_segment_length: f64::INFINITY,
            ..Self::default()
        }
    }

    /// Set the sharp turn threshold as a cosine.
    #[must_use]
    pub const fn with_sharp_turn_cos(mut self, cos: f64) -> Self {
        self.sharp_turn_cos = cos;
        self
    }

    /// Set the sharp turn threshold as an angle in radians.
    #[must_use]
    pub fn with_sharp_turn_angle(mut self, radians: f64) -> Self {
        self.sharp_turn_cos = radians.cos();
        self
    }

    /// Set the segment length above which joins are sharp.
    #[must_use]
    pub const fn with_long_segment_length(mut self, length: f64) -> Self {
        self.long_segment_length = length;
        self
    }

    /// Set the minimum accepted segment length.
    #[must_use]
    pub const fn with_min_segment_length(mut self, length: f64) -> Self {
        self.min_segment_length = length;
        self
    }

    /// Set the maximum accepted gap when closing a loop.
    #[must_use]
    pub const fn with_closure_tolerance(mut self, tolerance: f64) -> Self {
        self.closure_tolerance = tolerance;
        self
    }
}

/// Parameters for loading layered toolpaths into preview volumes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreviewConfig {
    /// Tessellation parameters used for every path.
    pub tessellation: TessellationConfig,

    /// A volume that grows past this many vertices is closed and a new one
    /// started for the following layers.
    ///
    /// Default: 131072 (about 3 MB of vertex data)
    pub max_vertices_per_volume: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            tessellation: TessellationConfig::default(),
            max_vertices_per_volume: 131_072,
        }
    }
}

impl PreviewConfig {
    /// Use the given tessellation parameters.
    #[must_use]
    pub fn with_tessellation(mut self, tessellation: TessellationConfig) -> Self {
        self.tessellation = tessellation;
        self
    }

    /// Set the vertex budget per volume.
    #[must_use]
    pub const fn with_max_vertices_per_volume(mut self, max: usize) -> Self {
        self.max_vertices_per_volume = max;
        self
    }
}
