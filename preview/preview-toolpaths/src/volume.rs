//! Layered toolpath volumes for the print preview.
//!
//! Toolpaths are grouped by role into volumes, each one a single
//! [`Geometry`] drawn in one colour. Volumes remember where every layer
//! starts in their index buffer, so a layer range can be shown by drawing
//! a contiguous slice of indices.

use std::ops::Range;

use nalgebra::Vector2;
use preview_types::{Aabb, Geometry};
use tracing::{debug, info};

use crate::config::PreviewConfig;
use crate::entity::{ExtrusionEntity, extrusion_entity_to_geometry};
use crate::error::TessellateResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a toolpath does in the print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ToolpathRole {
    /// Walls.
    Perimeter,
    /// Interior fill, sparse or solid.
    Infill,
    /// Support material.
    Support,
    /// Skirt and brim.
    Skirt,
}

impl ToolpathRole {
    /// All roles, in volume order.
    pub const ALL: [Self; 4] = [Self::Perimeter, Self::Infill, Self::Support, Self::Skirt];

    /// Display colour as RGBA.
    #[must_use]
    pub const fn color(self) -> [f32; 4] {
        match self {
            Self::Perimeter => [1.0, 1.0, 0.0, 1.0],
            Self::Infill => [1.0, 0.5, 0.5, 1.0],
            Self::Support | Self::Skirt => [0.5, 1.0, 0.5, 1.0],
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Perimeter => 0,
            Self::Infill => 1,
            Self::Support => 2,
            Self::Skirt => 3,
        }
    }
}

/// One drawable batch of toolpaths sharing a role.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ToolpathVolume {
    /// Tessellated toolpaths.
    pub geometry: Geometry,
    /// Role of every toolpath in the volume.
    pub role: ToolpathRole,
    /// Display colour as RGBA.
    pub color: [f32; 4],
    /// Print height of each layer, ascending.
    pub print_zs: Vec<f64>,
    /// Index buffer offset at which each layer in `print_zs` starts.
    pub offsets: Vec<usize>,
}

impl ToolpathVolume {
    /// Create an empty volume for a role, in the role's colour.
    #[must_use]
    pub fn new(role: ToolpathRole) -> Self {
        Self {
            geometry: Geometry::new(),
            role,
            color: role.color(),
            print_zs: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// True when the volume holds no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    /// Bounding box of the volume's vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.geometry.bounds()
    }

    /// Mark the start of layer `print_z` unless it is already the current layer.
    pub fn begin_layer(&mut self, print_z: f64) {
        if self.print_zs.last() != Some(&print_z) {
            self.print_zs.push(print_z);
            self.offsets.push(self.geometry.indices.len());
        }
    }

    /// Slice of the index buffer covering the layers within `[min_z, max_z]`.
    ///
    /// A volume without layer records is always fully visible. A volume
    /// lying entirely outside the range yields an empty range.
    ///
    /// # Example
    ///
    /// ```
    /// use preview_toolpaths::{ToolpathRole, ToolpathVolume};
    ///
    /// let mut volume = ToolpathVolume::new(ToolpathRole::Perimeter);
    /// volume.geometry.indices = vec![0; 90];
    /// volume.print_zs = vec![0.2, 0.4, 0.6];
    /// volume.offsets = vec![0, 30, 60];
    ///
    /// assert_eq!(volume.visible_range(0.3, 0.5), 30..60);
    /// assert_eq!(volume.visible_range(0.0, 1.0), 0..90);
    /// assert!(volume.visible_range(0.7, 1.0).is_empty());
    /// ```
    #[must_use]
    pub fn visible_range(&self, min_z: f64, max_z: f64) -> Range<usize> {
        let full = 0..self.geometry.indices.len();
        let (Some(&lowest), Some(&highest)) = (self.print_zs.first(), self.print_zs.last()) else {
            return full;
        };
        if lowest > max_z || highest < min_z {
            return 0..0;
        }

        let Some(first) = self.print_zs.iter().position(|&z| z >= min_z) else {
            return 0..0;
        };
        let start = self.offsets[first];
        let end = self.print_zs[first..]
            .iter()
            .position(|&z| z > max_z)
            .map_or(full.end, |past| self.offsets[first + past]);
        start..end
    }
}

/// Toolpaths of one layer, tagged with their role.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerToolpaths {
    /// Top of the layer.
    pub print_z: f64,
    /// Extrusions of the layer and their roles.
    pub entities: Vec<(ToolpathRole, ExtrusionEntity)>,
}

impl LayerToolpaths {
    /// Create an empty layer.
    #[must_use]
    pub fn new(print_z: f64) -> Self {
        Self {
            print_z,
            entities: Vec::new(),
        }
    }

    /// Add an extrusion with its role.
    #[must_use]
    pub fn with(mut self, role: ToolpathRole, entity: impl Into<ExtrusionEntity>) -> Self {
        self.entities.push((role, entity.into()));
        self
    }
}

/// Tessellate layered toolpaths into per-role preview volumes.
///
/// Layers are processed bottom-up by `print_z`. Every entity is repeated
/// for each instance offset in `copies`; no copies means a single instance
/// at the origin. A volume that has grown past
/// [`PreviewConfig::max_vertices_per_volume`] after a layer is closed and a
/// fresh one started for the same role. Volumes left without triangles are
/// dropped.
///
/// # Errors
///
/// Propagates the first tessellation error.
pub fn load_layer_toolpaths(
    layers: &[LayerToolpaths],
    copies: &[Vector2<f64>],
    config: &PreviewConfig,
) -> TessellateResult<Vec<ToolpathVolume>> {
    info!(
        "Loading toolpaths of {} layers, {} copies",
        layers.len(),
        copies.len().max(1)
    );

    let mut ordered: Vec<&LayerToolpaths> = layers.iter().collect();
    ordered.sort_by(|a, b| a.print_z.total_cmp(&b.print_z));

    let origin = [Vector2::zeros()];
    let copies = if copies.is_empty() { &origin[..] } else { copies };

    let mut current = ToolpathRole::ALL.map(ToolpathVolume::new);
    let mut finished = Vec::new();

    for layer in ordered {
        for volume in &mut current {
            volume.begin_layer(layer.print_z);
        }
        for copy in copies {
            for (role, entity) in &layer.entities {
                let volume = &mut current[role.slot()];
                extrusion_entity_to_geometry(
                    entity,
                    layer.print_z,
                    copy,
                    &mut volume.geometry,
                    &config.tessellation,
                )?;
            }
        }
        for volume in &mut current {
            if volume.geometry.vertex_count() > config.max_vertices_per_volume {
                debug!(
                    "Splitting {:?} volume at z = {} with {} vertices",
                    volume.role,
                    layer.print_z,
                    volume.geometry.vertex_count()
                );
                let role = volume.role;
                let full = std::mem::replace(volume, ToolpathVolume::new(role));
                finished.push(full);
            }
        }
    }

    finished.extend(current);
    finished.retain(|volume| !volume.is_empty());

    info!("Loaded {} toolpath volumes", finished.len());
    Ok(finished)
}
