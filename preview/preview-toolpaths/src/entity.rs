//! Extrusion entities and their flattening into thick line runs.
//!
//! A slicer describes each layer as a tree of extrusions: single paths,
//! closed loops (perimeters), chains of paths, and nested collections.
//! The tessellator only understands runs of segments, so every entity is
//! flattened first.

use nalgebra::{Point2, Point3, Vector2};
use preview_types::{Geometry, Line2, Line3, PlanarLines, SpatialLines};

use crate::config::TessellationConfig;
use crate::error::{TessellateError, TessellateResult};
use crate::tessellate::{thick_lines_3d_to_geometry, thick_lines_to_geometry};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An open polyline extruded with one width and height.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrusionPath {
    /// Centerline points in travel order.
    pub polyline: Vec<Point2<f64>>,
    /// Extrusion width.
    pub width: f64,
    /// Layer height of the extrusion.
    pub height: f64,
}

impl ExtrusionPath {
    /// Create a path.
    #[must_use]
    pub fn new(polyline: Vec<Point2<f64>>, width: f64, height: f64) -> Self {
        Self {
            polyline,
            width,
            height,
        }
    }

    /// Segments of the polyline moved by `copy`, with repeated points removed.
    #[must_use]
    pub fn lines(&self, copy: &Vector2<f64>) -> Vec<Line2> {
        let mut points: Vec<Point2<f64>> = self.polyline.iter().map(|p| p + copy).collect();
        points.dedup();
        points.windows(2).map(|w| Line2::new(w[0], w[1])).collect()
    }

    fn append_to(&self, run: &mut PlanarLines, copy: &Vector2<f64>) {
        run.extend_uniform(self.lines(copy), self.width, self.height);
    }
}

/// Paths forming one closed loop, each ending where the next begins.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrusionLoop {
    /// Paths around the loop.
    pub paths: Vec<ExtrusionPath>,
}

/// Paths forming one open chain, each ending where the next begins.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrusionMultiPath {
    /// Paths along the chain.
    pub paths: Vec<ExtrusionPath>,
}

/// An unordered group of entities.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrusionEntityCollection {
    /// Member entities.
    pub entities: Vec<ExtrusionEntity>,
}

/// Any extrusion the preview can display.
///
/// # Example
///
/// ```
/// use preview_toolpaths::{ExtrusionEntity, ExtrusionLoop, ExtrusionPath};
/// use nalgebra::{Point2, Vector2};
///
/// let square = ExtrusionPath::new(
///     vec![
///         Point2::new(0.0, 0.0),
///         Point2::new(10.0, 0.0),
///         Point2::new(10.0, 10.0),
///         Point2::new(0.0, 10.0),
///         Point2::new(0.0, 0.0),
///     ],
///     0.45,
///     0.2,
/// );
/// let perimeter = ExtrusionEntity::Loop(ExtrusionLoop { paths: vec![square] });
///
/// let runs = perimeter.flatten(&Vector2::zeros());
/// assert_eq!(runs.len(), 1);
/// assert!(runs[0].closed);
/// assert_eq!(runs[0].len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExtrusionEntity {
    /// A single open path.
    Path(ExtrusionPath),
    /// A closed loop.
    Loop(ExtrusionLoop),
    /// An open chain of paths.
    MultiPath(ExtrusionMultiPath),
    /// A nested group.
    Collection(ExtrusionEntityCollection),
}

impl ExtrusionEntity {
    /// Flatten into thick line runs, moved by `copy`.
    ///
    /// Loops become closed runs, paths and chains open ones; collections
    /// contribute the runs of their members in order. Entities without a
    /// single segment contribute nothing.
    #[must_use]
    pub fn flatten(&self, copy: &Vector2<f64>) -> Vec<PlanarLines> {
        let mut runs = Vec::new();
        self.flatten_into(copy, &mut runs);
        runs
    }

    fn flatten_into(&self, copy: &Vector2<f64>, runs: &mut Vec<PlanarLines>) {
        let run = match self {
            Self::Path(path) => {
                let mut run = PlanarLines::open();
                path.append_to(&mut run, copy);
                run
            }
            Self::Loop(extrusion_loop) => chain(&extrusion_loop.paths, copy, PlanarLines::closed()),
            Self::MultiPath(multi) => chain(&multi.paths, copy, PlanarLines::open()),
            Self::Collection(collection) => {
                for entity in &collection.entities {
                    entity.flatten_into(copy, runs);
                }
                return;
            }
        };
        if !run.is_empty() {
            runs.push(run);
        }
    }
}

fn chain(paths: &[ExtrusionPath], copy: &Vector2<f64>, mut run: PlanarLines) -> PlanarLines {
    for path in paths {
        path.append_to(&mut run, copy);
    }
    run
}

impl From<ExtrusionPath> for ExtrusionEntity {
    fn from(path: ExtrusionPath) -> Self {
        Self::Path(path)
    }
}

impl From<ExtrusionLoop> for ExtrusionEntity {
    fn from(extrusion_loop: ExtrusionLoop) -> Self {
        Self::Loop(extrusion_loop)
    }
}

impl From<ExtrusionMultiPath> for ExtrusionEntity {
    fn from(multi: ExtrusionMultiPath) -> Self {
        Self::MultiPath(multi)
    }
}

impl From<ExtrusionEntityCollection> for ExtrusionEntity {
    fn from(collection: ExtrusionEntityCollection) -> Self {
        Self::Collection(collection)
    }
}

/// Tessellate every run of an entity at layer height `print_z`, moved by `copy`.
///
/// All runs are built first and appended together, so a failing run leaves
/// `geometry` untouched.
///
/// # Errors
///
/// Propagates the first tessellation error of any run, and returns
/// [`TessellateError::IndexOverflow`] if the combined buffer would exceed
/// the `u32` index range.
pub fn extrusion_entity_to_geometry(
    entity: &ExtrusionEntity,
    print_z: f64,
    copy: &Vector2<f64>,
    geometry: &mut Geometry,
    config: &TessellationConfig,
) -> TessellateResult<()> {
    let mut scratch = Geometry::new();
    for run in entity.flatten(copy) {
        thick_lines_to_geometry(&run, print_z, &mut scratch, config)?;
    }
    append_checked(geometry, &scratch)
}

/// Tessellate an open 3D polyline with a uniform cross-section.
///
/// Repeated points are removed first; fewer than two distinct points
/// produce nothing.
///
/// # Errors
///
/// Same as [`thick_lines_3d_to_geometry`].
pub fn polyline3_to_geometry(
    points: &[Point3<f64>],
    width: f64,
    height: f64,
    geometry: &mut Geometry,
    config: &TessellationConfig,
) -> TessellateResult<()> {
    let mut points = points.to_vec();
    points.dedup();
    let lines: Vec<Line3> = points.windows(2).map(|w| Line3::new(w[0], w[1])).collect();
    let run = SpatialLines::uniform(lines, width, height, false);
    thick_lines_3d_to_geometry(&run, geometry, config)
}

fn append_checked(geometry: &mut Geometry, block: &Geometry) -> TessellateResult<()> {
    if block.is_empty() {
        return Ok(());
    }
    if geometry.append(block) {
        return Ok(());
    }
    let required = geometry.vertex_count() as u64 + block.vertex_count() as u64;
    Err(TessellateError::IndexOverflow { required })
}
