//! Interleaved vertex/normal buffer with triangle indices.

use crate::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of `f32` values stored per vertex: position (3) then normal (3).
pub const FLOATS_PER_VERTEX: usize = 6;

/// GPU-ready indexed triangle geometry.
///
/// Many toolpaths are appended into one `Geometry` in sequence; a renderer
/// uploads both arrays unchanged.
///
/// # Memory Layout
///
/// - `vertices_and_normals`: `[px, py, pz, nx, ny, nz]` per vertex
/// - `indices`: three vertex indices per triangle
///
/// # Winding Order
///
/// Triangles use **counter-clockwise (CCW) winding** when viewed from outside.
///
/// # Example
///
/// ```
/// use preview_types::{Geometry, Point3, Vector3};
///
/// let mut geometry = Geometry::new();
/// let n = Vector3::z();
/// let a = geometry.push_geometry(Point3::new(0.0, 0.0, 0.0), n);
/// let b = geometry.push_geometry(Point3::new(1.0, 0.0, 0.0), n);
/// let c = geometry.push_geometry(Point3::new(1.0, 1.0, 0.0), n);
/// let d = geometry.push_geometry(Point3::new(0.0, 1.0, 0.0), n);
/// geometry.push_quad(a, b, c, d);
///
/// assert_eq!(geometry.triangle_count(), 2);
/// assert!((geometry.surface_area() - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    /// Interleaved vertex data, [`FLOATS_PER_VERTEX`] floats per vertex.
    pub vertices_and_normals: Vec<f32>,

    /// Triangle vertex indices, three per triangle, CCW from outside.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Create an empty buffer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices_and_normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices_and_normals.len() / FLOATS_PER_VERTEX
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the buffer holds no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Reserve capacity for additional vertices and triangles.
    pub fn reserve(&mut self, additional_vertices: usize, additional_triangles: usize) {
        self.vertices_and_normals
            .reserve(additional_vertices * FLOATS_PER_VERTEX);
        self.indices.reserve(additional_triangles * 3);
    }

    /// Append a vertex and return its index.
    ///
    /// Coordinates are narrowed to `f32` for upload.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: indices are u32 and vertex data is f32 on the GPU; callers
    // that append in bulk check the index range up front.
    pub fn push_geometry(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices_and_normals.extend_from_slice(&[
            position.x as f32,
            position.y as f32,
            position.z as f32,
            normal.x as f32,
            normal.y as f32,
            normal.z as f32,
        ]);
        index
    }

    /// Append one triangle.
    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append a planar quad `a b c d` as the two triangles `a b c` and `a c d`.
    #[inline]
    pub fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    /// Raw interleaved data of one vertex.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<[f32; FLOATS_PER_VERTEX]> {
        let start = index * FLOATS_PER_VERTEX;
        self.vertices_and_normals
            .get(start..start + FLOATS_PER_VERTEX)
            .and_then(|slice| slice.try_into().ok())
    }

    /// Position of a vertex.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.vertex(index).map(|v| {
            Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
        })
    }

    /// Stored normal of a vertex.
    #[must_use]
    pub fn normal(&self, index: usize) -> Option<Vector3<f64>> {
        self.vertex(index).map(|v| {
            Vector3::new(f64::from(v[3]), f64::from(v[4]), f64::from(v[5]))
        })
    }

    /// Iterate over all vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices_and_normals
            .chunks_exact(FLOATS_PER_VERTEX)
            .map(|v| Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])))
    }

    /// Index triple of one triangle.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<[u32; 3]> {
        self.indices
            .get(index * 3..index * 3 + 3)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// Iterate over all triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Resolve one triangle to its vertex positions.
    ///
    /// Returns `None` if the triangle or one of its vertices does not exist.
    #[must_use]
    pub fn triangle_positions(&self, index: usize) -> Option<Triangle> {
        let [a, b, c] = self.triangle(index)?;
        Some(Triangle::new(
            self.position(a as usize)?,
            self.position(b as usize)?,
            self.position(c as usize)?,
        ))
    }

    /// Bounding box of all vertices. Empty for an empty buffer.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for p in self.positions() {
            aabb.expand_to_include(&p);
        }
        aabb
    }

    /// Signed enclosed volume.
    ///
    /// Positive for closed surfaces with outward (CCW) winding, negative when
    /// inside-out. Not meaningful for open surfaces.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        (0..self.triangle_count())
            .filter_map(|i| self.triangle_positions(i))
            .map(|tri| tri.signed_volume())
            .sum()
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.triangle_count())
            .filter_map(|i| self.triangle_positions(i))
            .map(|tri| tri.area())
            .sum()
    }

    /// Append another buffer, rebasing its indices past this buffer's vertices.
    ///
    /// This is how independently tessellated paths are concatenated.
    /// Returns `false` and leaves this buffer unchanged if the combined
    /// vertex count does not fit the `u32` index range.
    ///
    /// # Example
    ///
    /// ```
    /// use preview_types::{Geometry, Point3, Vector3};
    ///
    /// let mut block = Geometry::new();
    /// for x in [0.0, 1.0, 2.0] {
    ///     block.push_geometry(Point3::new(x, 0.0, 0.0), Vector3::z());
    /// }
    /// block.push_triangle(0, 1, 2);
    ///
    /// let mut all = block.clone();
    /// assert!(all.append(&block));
    /// assert_eq!(all.triangle(1), Some([3, 4, 5]));
    /// ```
    #[must_use]
    pub fn append(&mut self, other: &Self) -> bool {
        let Some(offset) = append_offset(self.vertex_count(), other.vertex_count()) else {
            return false;
        };
        self.vertices_and_normals
            .extend_from_slice(&other.vertices_and_normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
        true
    }
}

/// Index offset for `added` vertices placed after `existing` ones, if every
/// resulting index fits in `u32`.
fn append_offset(existing: usize, added: usize) -> Option<u32> {
    let offset = u32::try_from(existing).ok()?;
    offset.checked_add(u32::try_from(added).ok()?)?;
    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Closed unit cube built through the public push API.
    fn cube() -> Geometry {
        let mut g = Geometry::new();
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        for [x, y, z] in corners {
            let p = Point3::new(x, y, z);
            let n = (p - Point3::new(0.5, 0.5, 0.5)).normalize();
            g.push_geometry(p, n);
        }
        g.push_quad(0, 3, 2, 1); // bottom
        g.push_quad(4, 5, 6, 7); // top
        g.push_quad(0, 1, 5, 4); // front
        g.push_quad(2, 3, 7, 6); // back
        g.push_quad(0, 4, 7, 3); // left
        g.push_quad(1, 2, 6, 5); // right
        g
    }

    #[test]
    fn push_geometry_returns_sequential_indices() {
        let mut g = Geometry::new();
        assert_eq!(g.push_geometry(Point3::origin(), Vector3::z()), 0);
        assert_eq!(g.push_geometry(Point3::origin(), Vector3::z()), 1);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.vertices_and_normals.len(), 2 * FLOATS_PER_VERTEX);
    }

    #[test]
    fn vertex_layout_is_position_then_normal() {
        let mut g = Geometry::new();
        g.push_geometry(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(g.vertex(0), Some([1.0, 2.0, 3.0, 0.0, 0.0, -1.0]));
        assert!(g.vertex(1).is_none());
    }

    #[test]
    fn push_quad_splits_along_first_diagonal() {
        let mut g = Geometry::new();
        g.push_quad(4, 5, 6, 7);
        assert_eq!(g.triangle(0), Some([4, 5, 6]));
        assert_eq!(g.triangle(1), Some([4, 6, 7]));
    }

    #[test]
    fn cube_volume_and_area() {
        let g = cube();
        assert_relative_eq!(g.signed_volume(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(g.surface_area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn cube_bounds() {
        let bounds = cube().bounds();
        assert_relative_eq!(bounds.min, Point3::origin());
        assert_relative_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn append_rebases_indices() {
        let mut g = cube();
        let other = cube();
        assert!(g.append(&other));

        assert_eq!(g.vertex_count(), 16);
        assert_eq!(g.triangle_count(), 24);
        assert_eq!(g.triangle(12), other.triangle(0).map(|t| t.map(|i| i + 8)));
        assert_relative_eq!(g.signed_volume(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn append_offset_stays_in_index_range() {
        let max = u32::MAX as usize;
        assert_eq!(append_offset(8, 8), Some(8));
        assert_eq!(append_offset(max - 3, 3), Some(u32::MAX - 3));
        assert_eq!(append_offset(max - 2, 3), None);
        assert_eq!(append_offset(max + 1, 0), None);
    }

    #[test]
    fn append_leaves_buffer_alone_on_empty_input() {
        let mut g = cube();
        assert!(g.append(&Geometry::new()));
        assert_eq!(g, cube());
    }

    #[test]
    fn triangle_positions_out_of_range() {
        let g = cube();
        assert!(g.triangle_positions(12).is_none());
        assert!(g.triangle_positions(11).is_some());
    }

    #[test]
    fn empty_buffer() {
        let g = Geometry::new();
        assert!(g.is_empty());
        assert!(g.bounds().is_empty());
        assert_relative_eq!(g.signed_volume(), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let g = cube();
        let json = serde_json::to_string(&g).unwrap();
        let back: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }
}
