//! Tessellate thick extrusion toolpaths into closed tube meshes.
//!
//! Every printed line of a sliced model is shown in the preview as a tube
//! with a diamond cross-section swept along the toolpath. This crate builds
//! those tubes as GPU-ready [`Geometry`](preview_types::Geometry).
//!
//! # Features
//!
//! - **Planar and spatial toolpaths**: layer-bound runs with a shared top
//!   elevation, or free 3D polylines
//! - **Vertex sharing**: smooth joins reuse corner vertices, sharp joins
//!   split the outer corner and fill the gap with a wedge
//! - **Mitered corners**: corners meet on the plane bisecting the turn, so
//!   faces never lean away from their vertex normals
//! - **Closed loops**: the seam is an ordinary joint, with no duplicate vertices
//! - **Caps**: open ends and height changes are closed off
//! - **Preview loading**: extrusion entities grouped into per-role volumes
//!   with layer ranges
//!
//! Every tube is watertight and consistently wound outward;
//! [`validate_geometry`] checks that.
//!
//! # Quick Start
//!
//! ```
//! use preview_toolpaths::{TessellationConfig, thick_lines_to_geometry, validate_geometry};
//! use preview_types::{Geometry, Line2, PlanarLines, Point2};
//!
//! // A closed square perimeter, 0.45 mm wide, 0.2 mm layer at z = 0.2
//! let corners = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ];
//! let lines = (0..4)
//!     .map(|i| Line2::new(corners[i], corners[(i + 1) % 4]))
//!     .collect();
//! let perimeter = PlanarLines::uniform(lines, 0.45, 0.2, true);
//!
//! let mut geometry = Geometry::new();
//! thick_lines_to_geometry(&perimeter, 0.2, &mut geometry, &TessellationConfig::default())
//!     .unwrap();
//!
//! let report = validate_geometry(&geometry);
//! assert!(report.is_watertight());
//! assert!(report.signed_volume > 0.0);
//! ```
//!
//! # Concatenation
//!
//! Paths can be tessellated independently, for example on different
//! threads, and joined with [`Geometry::append`](preview_types::Geometry::append),
//! which rebases the indices of the appended block.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod cap;
mod config;
mod corner;
mod entity;
mod error;
mod frame;
mod joint;
mod tessellate;
mod validate;
mod volume;

pub use config::{PreviewConfig, TessellationConfig};
pub use corner::{Corner, Turn, classify_turn};
pub use entity::{
    ExtrusionEntity, ExtrusionEntityCollection, ExtrusionLoop, ExtrusionMultiPath, ExtrusionPath,
    extrusion_entity_to_geometry, polyline3_to_geometry,
};
pub use error::{TessellateError, TessellateResult};
pub use frame::CrossSection;
pub use tessellate::{thick_lines_3d_to_geometry, thick_lines_to_geometry};
pub use validate::{TopologyReport, normal_disagreements, validate_geometry};
pub use volume::{LayerToolpaths, ToolpathRole, ToolpathVolume, load_layer_toolpaths};
