//! Thick toolpath to tube mesh tessellation.
//!
//! A run of segments is swept with a diamond cross-section. Corners are
//! shared across smooth joins and split on the outside of sharp joins,
//! where a band of triangles closes the gap. Open ends and height or
//! position discontinuities inside the run are capped.

use nalgebra::Point3;
use preview_types::{Geometry, PlanarLines, SpatialLines, ThickLines};
use tracing::debug;

use crate::cap::{push_leading_cap, push_trailing_cap};
use crate::config::TessellationConfig;
use crate::corner::{Corner, CornerIndices, FACES, ResolvedCorners};
use crate::error::{TessellateError, TessellateResult};
use crate::frame::CrossSection;
use crate::joint::{Joint, Placement, push_joint, settle_miters};

/// Upper bound on vertices allocated per segment (a step allocates both boundaries).
const MAX_VERTICES_PER_SEGMENT: u64 = 8;

/// Tessellate planar toolpath segments whose top lies at `top_z`.
///
/// The mesh is appended to `geometry`; existing content is left untouched
/// and the new triangles only reference the new vertices. An empty run is
/// a no-op.
///
/// # Errors
///
/// Returns an error, without modifying `geometry`, if:
/// - `widths` or `heights` do not have one entry per segment
/// - a segment is shorter than [`TessellationConfig::min_segment_length`]
/// - a width, height or `top_z` is not a positive finite number
/// - a closed run does not end where it starts
/// - the vertex count could exceed the `u32` index range
///
/// # Example
///
/// ```
/// use preview_toolpaths::{TessellationConfig, thick_lines_to_geometry};
/// use preview_types::{Geometry, Line2, PlanarLines, Point2};
///
/// let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
/// let run = PlanarLines::uniform(vec![line], 1.0, 0.2, false);
///
/// let mut geometry = Geometry::new();
/// thick_lines_to_geometry(&run, 0.2, &mut geometry, &TessellationConfig::default()).unwrap();
///
/// assert_eq!(geometry.vertex_count(), 8);
/// assert_eq!(geometry.triangle_count(), 12);
/// ```
pub fn thick_lines_to_geometry(
    lines: &PlanarLines,
    top_z: f64,
    geometry: &mut Geometry,
    config: &TessellationConfig,
) -> TessellateResult<()> {
    if lines.is_empty() {
        return Ok(());
    }
    if !top_z.is_finite() {
        return Err(TessellateError::InvalidElevation(top_z));
    }
    validate_run(lines, |line| line.length(), config)?;

    let sections: Vec<CrossSection> = cross_sections(lines, |line, width, height| {
        CrossSection::planar(line, top_z, width, height)
    });
    tessellate_sections(&sections, lines.closed, geometry, config)
}

/// Tessellate segments in free space, centered on each segment.
///
/// Behaves like [`thick_lines_to_geometry`], except that cross-sections are
/// oriented in space. The first segment of every continuous stretch keeps
/// a horizontal `right`; later segments carry the previous frame along so
/// the tube does not twist. A planar run lifted to `top_z - height / 2`
/// produces the same mesh as the planar variant.
///
/// # Errors
///
/// Same conditions as [`thick_lines_to_geometry`], apart from the elevation check.
pub fn thick_lines_3d_to_geometry(
    lines: &SpatialLines,
    geometry: &mut Geometry,
    config: &TessellationConfig,
) -> TessellateResult<()> {
    if lines.is_empty() {
        return Ok(());
    }
    validate_run(lines, |line| line.length(), config)?;

    let mut sections = cross_sections(lines, CrossSection::spatial);
    carry_frames(&mut sections, config);
    tessellate_sections(&sections, lines.closed, geometry, config)
}

/// Check per-segment data before anything is built.
fn validate_run<L>(
    lines: &ThickLines<L>,
    length: impl Fn(&L) -> f64,
    config: &TessellationConfig,
) -> TessellateResult<()> {
    let expected = lines.len();
    for (field, actual) in [("widths", lines.widths.len()), ("heights", lines.heights.len())] {
        if actual != expected {
            return Err(TessellateError::LengthMismatch {
                field,
                expected,
                actual,
            });
        }
    }

    for (index, line) in lines.lines.iter().enumerate() {
        let len = length(line);
        if !(len.is_finite() && len >= config.min_segment_length) {
            return Err(TessellateError::DegenerateSegment { index });
        }
        let width = lines.widths[index];
        if !(width.is_finite() && width > 0.0) {
            return Err(TessellateError::InvalidWidth { index, value: width });
        }
        let height = lines.heights[index];
        if !(height.is_finite() && height > 0.0) {
            return Err(TessellateError::InvalidHeight { index, value: height });
        }
    }
    Ok(())
}

fn cross_sections<L>(
    lines: &ThickLines<L>,
    build: impl Fn(&L, f64, f64) -> CrossSection,
) -> Vec<CrossSection> {
    lines
        .lines
        .iter()
        .zip(&lines.widths)
        .zip(&lines.heights)
        .map(|((line, &width), &height)| build(line, width, height))
        .collect()
}

/// Let every section continuing from its predecessor follow its frame.
fn carry_frames(sections: &mut [CrossSection], config: &TessellationConfig) {
    for i in 1..sections.len() {
        let prev = sections[i - 1];
        if !is_discontinuous(&prev, &sections[i], config) {
            sections[i].follow(&prev);
        }
    }
}

/// True when two consecutive sections cannot share a boundary.
fn is_discontinuous(prev: &CrossSection, next: &CrossSection, config: &TessellationConfig) -> bool {
    height_changes(prev, next, config)
        || (next.start - prev.end).norm() > config.elevation_tolerance
}

fn height_changes(prev: &CrossSection, next: &CrossSection, config: &TessellationConfig) -> bool {
    (prev.height - next.height).abs() > config.elevation_tolerance
}

/// Validate closure and index range, then emit.
fn tessellate_sections(
    sections: &[CrossSection],
    closed: bool,
    geometry: &mut Geometry,
    config: &TessellationConfig,
) -> TessellateResult<()> {
    let (Some(first), Some(last)) = (sections.first(), sections.last()) else {
        return Ok(());
    };

    if closed {
        // A single segment cannot enclose anything, however short.
        if sections.len() < 2 {
            return Err(TessellateError::UnclosedLoop { gap: first.length });
        }
        let gap = (first.start - last.end).norm();
        if gap > config.closure_tolerance {
            return Err(TessellateError::UnclosedLoop { gap });
        }
    }

    let required =
        geometry.vertex_count() as u64 + MAX_VERTICES_PER_SEGMENT * sections.len() as u64;
    if required > u64::from(u32::MAX) {
        return Err(TessellateError::IndexOverflow { required });
    }

    let base_vertices = geometry.vertex_count();
    let base_triangles = geometry.triangle_count();
    geometry.reserve(4 + 5 * sections.len(), 4 + 10 * sections.len());

    Emitter {
        geometry: &mut *geometry,
        config,
    }
    .run(sections, closed)?;

    debug!(
        "Tessellated {} segments (closed: {}) into {} vertices, {} triangles",
        sections.len(),
        closed,
        geometry.vertex_count() - base_vertices,
        geometry.triangle_count() - base_triangles
    );
    Ok(())
}

/// Joints into every section; `joints[0]` is the seam of a closed run.
///
/// Discontinuous joins get no joint. The seam only needs matching heights,
/// since closure was checked against its own tolerance.
fn joints(
    sections: &[CrossSection],
    closed: bool,
    config: &TessellationConfig,
) -> Vec<Option<Joint>> {
    let mut joints = Vec::with_capacity(sections.len());
    joints.push(match (sections.last(), sections.first()) {
        (Some(last), Some(first)) if closed && !height_changes(last, first, config) => {
            Some(Joint::between(last, first, config))
        }
        _ => None,
    });
    joints.extend(sections.windows(2).map(|pair| {
        (!is_discontinuous(&pair[0], &pair[1], config))
            .then(|| Joint::between(&pair[0], &pair[1], config))
    }));
    joints
}

/// Appends one run to the output buffer.
struct Emitter<'a> {
    geometry: &'a mut Geometry,
    config: &'a TessellationConfig,
}

impl Emitter<'_> {
    fn run(&mut self, sections: &[CrossSection], closed: bool) -> TessellateResult<()> {
        let count = sections.len();
        let mut joints = joints(sections, closed, self.config);
        settle_miters(sections, &mut joints);
        let seam = joints.first().copied().flatten();

        let mut initial: Option<ResolvedCorners> = None;
        let mut prev: Option<ResolvedCorners> = None;

        for (i, section) in sections.iter().enumerate() {
            let start = match (prev, joints[i]) {
                (None, Some(joint)) => {
                    self.ring(CornerIndices::default(), |c| joint.corner(c).start_placement())?
                }
                (None, None) => {
                    let corners = self.fresh(section, &section.start)?;
                    if !closed {
                        push_leading_cap(self.geometry, &corners);
                    }
                    corners
                }
                (Some(tail), None) => {
                    push_trailing_cap(self.geometry, &tail);
                    let corners = self.fresh(section, &section.start)?;
                    push_leading_cap(self.geometry, &corners);
                    corners
                }
                (Some(tail), Some(joint)) => {
                    let corners =
                        self.ring(joint.shared_from(&tail), |c| joint.corner(c).start_placement())?;
                    push_joint(self.geometry, &tail, &corners);
                    corners
                }
            };
            let first = *initial.get_or_insert(start);

            let is_last = i + 1 == count;
            let after = if is_last { seam } else { joints[i + 1] };
            let end = match after {
                None => self.fresh(section, &section.end)?,
                // The last section closes onto the corners the seam shares.
                Some(joint) if is_last => {
                    self.ring(joint.shared_from(&first), |c| joint.corner(c).end)?
                }
                Some(joint) => self.ring(CornerIndices::default(), |c| joint.corner(c).end)?,
            };
            if !closed && is_last {
                push_trailing_cap(self.geometry, &end);
            }

            self.push_body(&start, &end);
            prev = Some(end);
        }

        if let (true, Some(first), Some(tail)) = (closed, initial, prev) {
            if seam.is_some() {
                push_joint(self.geometry, &tail, &first);
            } else {
                push_trailing_cap(self.geometry, &tail);
                push_leading_cap(self.geometry, &first);
            }
        }
        Ok(())
    }

    /// Allocate the unset corners of `corners` at the placements `place` gives.
    fn ring(
        &mut self,
        mut corners: CornerIndices,
        place: impl Fn(Corner) -> Placement,
    ) -> TessellateResult<ResolvedCorners> {
        corners.allocate_missing(self.geometry, place);
        corners.resolve()
    }

    /// A boundary of `section`'s own corners around `center`.
    fn fresh(
        &mut self,
        section: &CrossSection,
        center: &Point3<f64>,
    ) -> TessellateResult<ResolvedCorners> {
        self.ring(CornerIndices::default(), |c| section.corner(center, c))
    }

    /// Four faces between two boundaries, two triangles each.
    fn push_body(&mut self, a: &ResolvedCorners, b: &ResolvedCorners) {
        for (from, to) in FACES {
            self.geometry
                .push_quad(a.get(from), b.get(from), b.get(to), a.get(to));
        }
    }
}
