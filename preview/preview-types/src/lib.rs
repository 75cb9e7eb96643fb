//! Core types for toolpath preview meshes.
//!
//! This crate provides the data exchanged between a slicer's toolpath
//! producer, the tessellator, and a renderer:
//!
//! - [`Line2`] / [`Line3`] - Toolpath segments (planar or spatial)
//! - [`ThickLines`] - Segments with per-segment extrusion width and height
//! - [`Geometry`] - Interleaved position/normal vertices plus triangle indices
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies** and no GPU API.
//! [`Geometry`] is laid out so a renderer can upload it verbatim.
//!
//! # Units
//!
//! Segment coordinates, widths and heights are `f64` millimeters.
//! Vertex data is stored as `f32`, which is what the GPU consumes.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system** with Z up (print direction).
//! Face winding is **counter-clockwise (CCW) when viewed from outside**.
//!
//! # Example
//!
//! ```
//! use preview_types::{Geometry, Point3, Vector3};
//!
//! let mut geometry = Geometry::new();
//! let a = geometry.push_geometry(Point3::new(0.0, 0.0, 0.0), Vector3::z());
//! let b = geometry.push_geometry(Point3::new(1.0, 0.0, 0.0), Vector3::z());
//! let c = geometry.push_geometry(Point3::new(0.0, 1.0, 0.0), Vector3::z());
//! geometry.push_triangle(a, b, c);
//!
//! assert_eq!(geometry.vertex_count(), 3);
//! assert_eq!(geometry.triangle_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod geometry;
mod line;
mod path;
mod triangle;

pub use bounds::Aabb;
pub use geometry::{FLOATS_PER_VERTEX, Geometry};
pub use line::{Line2, Line3};
pub use path::{PlanarLines, SpatialLines, ThickLines};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
