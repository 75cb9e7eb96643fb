//! Topology and shading checks for tessellated geometry.
//!
//! A tube produced by the tessellator is a closed two-manifold with
//! consistent outward winding. These checks verify that for a whole buffer.

use hashbrown::HashMap;
use preview_types::Geometry;

/// Report of the topology of a geometry buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of triangles.
    pub triangle_count: usize,
    /// Number of distinct undirected edges.
    pub edge_count: usize,

    /// Edges used by exactly one triangle.
    pub boundary_edge_count: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edge_count: usize,
    /// Directed edges traversed by more than one triangle.
    ///
    /// Two neighbours with consistent winding traverse their shared edge in
    /// opposite directions.
    pub repeated_directed_edge_count: usize,
    /// Vertices not referenced by any triangle.
    pub unreferenced_vertex_count: usize,
    /// Triangle indices pointing past the vertex buffer.
    pub out_of_range_index_count: usize,

    /// Signed enclosed volume; positive for outward winding.
    pub signed_volume: f64,
}

impl TopologyReport {
    /// Every edge is shared by exactly two triangles.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
            && self.non_manifold_edge_count == 0
            && self.out_of_range_index_count == 0
    }

    /// Neighbouring triangles agree on orientation.
    #[must_use]
    pub fn is_consistently_wound(&self) -> bool {
        self.repeated_directed_edge_count == 0
    }

    /// `V - E + F`: 2 per closed tube section, 0 per stitched loop.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    // Wrap: counts are far below i64::MAX
    pub fn euler_characteristic(&self) -> i64 {
        self.vertex_count as i64 - self.edge_count as i64 + self.triangle_count as i64
    }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(
            f,
            "  Watertight: {}",
            if self.is_watertight() { "Yes" } else { "No" }
        )?;
        writeln!(
            f,
            "  Winding: {}",
            if self.is_consistently_wound() {
                "Consistent"
            } else {
                "Inconsistent"
            }
        )?;
        writeln!(f, "  Signed volume: {:.6}", self.signed_volume)?;

        if self.boundary_edge_count > 0 {
            writeln!(f, "  Boundary edges: {}", self.boundary_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "  Non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        if self.repeated_directed_edge_count > 0 {
            writeln!(f, "  Repeated directed edges: {}", self.repeated_directed_edge_count)?;
        }
        if self.unreferenced_vertex_count > 0 {
            writeln!(f, "  Unreferenced vertices: {}", self.unreferenced_vertex_count)?;
        }
        if self.out_of_range_index_count > 0 {
            writeln!(f, "  Out-of-range indices: {}", self.out_of_range_index_count)?;
        }
        Ok(())
    }
}

/// Build a topology report for a geometry buffer.
///
/// # Example
///
/// ```
/// use preview_toolpaths::{TessellationConfig, thick_lines_to_geometry, validate_geometry};
/// use preview_types::{Geometry, Line2, PlanarLines, Point2};
///
/// let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
/// let mut geometry = Geometry::new();
/// thick_lines_to_geometry(
///     &PlanarLines::uniform(vec![line], 1.0, 0.2, false),
///     0.2,
///     &mut geometry,
///     &TessellationConfig::default(),
/// )
/// .unwrap();
///
/// let report = validate_geometry(&geometry);
/// assert!(report.is_watertight());
/// assert!(report.is_consistently_wound());
/// assert_eq!(report.euler_characteristic(), 2);
/// ```
#[must_use]
pub fn validate_geometry(geometry: &Geometry) -> TopologyReport {
    let vertex_count = geometry.vertex_count();
    let mut undirected: HashMap<(u32, u32), usize> = HashMap::new();
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    let mut referenced = vec![false; vertex_count];
    let mut out_of_range_index_count = 0;

    for triangle in geometry.triangles() {
        for &v in &triangle {
            match referenced.get_mut(v as usize) {
                Some(slot) => *slot = true,
                None => out_of_range_index_count += 1,
            }
        }
        for (a, b) in [
            (triangle[0], triangle[1]),
            (triangle[1], triangle[2]),
            (triangle[2], triangle[0]),
        ] {
            *undirected.entry(normalize_edge(a, b)).or_default() += 1;
            *directed.entry((a, b)).or_default() += 1;
        }
    }

    TopologyReport {
        vertex_count,
        triangle_count: geometry.triangle_count(),
        edge_count: undirected.len(),
        boundary_edge_count: undirected.values().filter(|&&n| n == 1).count(),
        non_manifold_edge_count: undirected.values().filter(|&&n| n > 2).count(),
        repeated_directed_edge_count: directed.values().filter(|&&n| n > 1).count(),
        unreferenced_vertex_count: referenced.iter().filter(|&&used| !used).count(),
        out_of_range_index_count,
        signed_volume: geometry.signed_volume(),
    }
}

/// Count (triangle, corner) pairs whose stored vertex normal points away
/// from the triangle's face normal.
///
/// A pair counts when the dot product of the unit face normal and the stored
/// normal is below `-tolerance`. Zero-area triangles are skipped.
#[must_use]
pub fn normal_disagreements(geometry: &Geometry, tolerance: f64) -> usize {
    (0..geometry.triangle_count())
        .filter_map(|i| {
            let face = geometry.triangle_positions(i)?.normal()?;
            let indices = geometry.triangle(i)?;
            Some(
                indices
                    .iter()
                    .filter_map(|&v| geometry.normal(v as usize))
                    .filter(|normal| face.dot(normal) < -tolerance)
                    .count(),
            )
        })
        .sum()
}

#[inline]
fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
