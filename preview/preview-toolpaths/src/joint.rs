//! Joints between consecutive segments of a continuous tube.
//!
//! At every joint each corner either carries one vertex shared by both
//! segments or is split into an end vertex of the previous segment and a
//! start vertex of the next one. Corners move onto the miter plane between
//! the two segment directions when both segments are long enough to reach
//! it, so no face of the tube ends up facing against its vertex normals.
//!
//! Corners stay where their own segment puts them when a miter would eat
//! too much of a segment. Short segments around tight turns, reversals and
//! width changes at a joint can then leave faces that lean away from a
//! vertex normal; the surface is still closed.

use nalgebra::{Point3, Vector3};
use preview_types::Geometry;

use crate::config::TessellationConfig;
use crate::corner::{Corner, CornerIndices, FACES, ResolvedCorners, Turn, classify_turn};
use crate::frame::CrossSection;

/// Share of a segment's length the miters at both of its ends may take.
const MITER_REACH: f64 = 0.95;

/// Length below which a sum of unit vectors has no usable direction.
const DIRECTION_EPSILON: f64 = 1e-9;

/// Position and normal of a corner vertex.
pub(crate) type Placement = (Point3<f64>, Vector3<f64>);

/// Where a corner lands on the miter plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Miter {
    /// Corner position on the miter plane.
    pub point: Point3<f64>,
    /// How far `point` lies behind the end of the previous segment.
    pub back: f64,
    /// How far `point` lies ahead of the start of the next segment.
    pub ahead: f64,
}

/// How one corner crosses a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CornerJoin {
    /// The previous segment's end vertex, or the shared vertex.
    pub end: Placement,
    /// The next segment's start vertex; `None` when the vertex is shared.
    pub start: Option<Placement>,
    /// Miter the corner moves to once both segments are known to reach it.
    pub miter: Option<Miter>,
}

impl CornerJoin {
    pub(crate) const fn is_shared(&self) -> bool {
        self.start.is_none()
    }

    /// Placement of the vertex starting the next segment.
    pub(crate) fn start_placement(&self) -> Placement {
        self.start.unwrap_or(self.end)
    }

    fn back(&self) -> f64 {
        self.miter.map_or(0.0, |m| m.back.max(0.0))
    }

    fn ahead(&self) -> f64 {
        self.miter.map_or(0.0, |m| m.ahead.max(0.0))
    }

    fn accept_miter(&mut self) {
        let Some(miter) = self.miter else {
            return;
        };
        self.end.0 = miter.point;
        if let Some(start) = &mut self.start {
            start.0 = miter.point;
        }
    }
}

/// The four corners of a joint, indexed like [`Corner::ALL`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Joint {
    corners: [CornerJoin; 4],
}

impl Joint {
    /// Decide how every corner crosses from `prev` into `next`.
    ///
    /// Straight joins share every corner unchanged. Smooth joins share
    /// every corner with the normals blended. Sharp joins split the outer
    /// corners into a bevel when the turn keeps the cross-section aligned,
    /// and split every corner onto the miter plane when it twists.
    pub(crate) fn between(
        prev: &CrossSection,
        next: &CrossSection,
        config: &TessellationConfig,
    ) -> Self {
        let turn = classify_turn(prev, next, config);
        let aligned = turns_about_frame_axis(prev, next);

        let corners = Corner::ALL.map(|corner| {
            let end = prev.corner(&prev.end, corner);
            if turn == Turn::Straight {
                return CornerJoin {
                    end,
                    start: None,
                    miter: None,
                };
            }

            let start = next.corner(&next.start, corner);
            let miter = miter(prev, next, &end.0);
            match turn {
                Turn::Sharp if !aligned => CornerJoin {
                    end,
                    start: Some(start),
                    miter,
                },
                Turn::Sharp if is_outer(prev, next, &end.0) => CornerJoin {
                    end,
                    start: Some(start),
                    miter: None,
                },
                _ => {
                    let normal = (end.1 + start.1)
                        .try_normalize(DIRECTION_EPSILON)
                        .unwrap_or(end.1);
                    CornerJoin {
                        end: (end.0, normal),
                        start: None,
                        miter,
                    }
                }
            }
        });
        Self { corners }
    }

    pub(crate) const fn corner(&self, corner: Corner) -> &CornerJoin {
        &self.corners[corner.index()]
    }

    /// The indices of `corners` this joint shares; split corners stay unset.
    pub(crate) fn shared_from(&self, corners: &ResolvedCorners) -> CornerIndices {
        let mut shared = CornerIndices::default();
        for corner in Corner::ALL {
            if self.corner(corner).is_shared() {
                shared.set(corner, Some(corners.get(corner)));
            }
        }
        shared
    }
}

/// True when the turn rotates about the previous frame's `up` or `right`,
/// which keeps the cross-section square to itself across the joint.
fn turns_about_frame_axis(prev: &CrossSection, next: &CrossSection) -> bool {
    prev.tangent
        .cross(&next.tangent)
        .try_normalize(1e-12)
        .is_none_or(|axis| {
            let along = axis.dot(&prev.up).abs().max(axis.dot(&prev.right).abs());
            along > 1.0 - DIRECTION_EPSILON
        })
}

/// A corner lies outside the bend when it points against the next segment.
fn is_outer(prev: &CrossSection, next: &CrossSection, position: &Point3<f64>) -> bool {
    let offset = position - prev.end;
    offset.dot(&next.tangent) < -DIRECTION_EPSILON * offset.norm()
}

/// Slide a corner of `prev`'s end along `prev` onto the bisecting plane.
fn miter(prev: &CrossSection, next: &CrossSection, position: &Point3<f64>) -> Option<Miter> {
    let plane = (prev.tangent + next.tangent).try_normalize(DIRECTION_EPSILON)?;
    let shift = -(position - prev.end).dot(&plane) / prev.tangent.dot(&plane);
    let point = position + prev.tangent * shift;
    Some(Miter {
        point,
        back: -shift,
        ahead: (point - next.start).dot(&next.tangent),
    })
}

/// Move corners onto their miter points where the segments can afford it.
///
/// `joints[i]` leads into `sections[i]`; `joints[0]` is the seam of a
/// closed run. A miter is taken when, together with the miter at the far
/// end of the same segment, it stays within [`MITER_REACH`] of each
/// segment it moves along. Every decision reads the unsettled joints.
pub(crate) fn settle_miters(sections: &[CrossSection], joints: &mut [Option<Joint>]) {
    let count = joints.len();
    let mut accepted = vec![[false; 4]; count];

    for (i, joint) in joints.iter().enumerate() {
        let Some(joint) = joint else {
            continue;
        };
        let before = (i + count - 1) % count;
        let after = (i + 1) % count;
        for corner in Corner::ALL {
            let Some(miter) = joint.corner(corner).miter else {
                continue;
            };
            let behind = joints[before]
                .as_ref()
                .map_or(0.0, |j| j.corner(corner).ahead());
            let beyond = joints[after]
                .as_ref()
                .map_or(0.0, |j| j.corner(corner).back());
            accepted[i][corner.index()] = miter.back + behind
                <= MITER_REACH * sections[before].length
                && miter.ahead + beyond <= MITER_REACH * sections[i].length;
        }
    }

    for (joint, accepted) in joints.iter_mut().zip(accepted) {
        let Some(joint) = joint else {
            continue;
        };
        for (join, accepted) in joint.corners.iter_mut().zip(accepted) {
            if accepted {
                join.accept_miter();
            }
        }
    }
}

/// Connect the end of one segment to the start of the next.
///
/// Each lateral face becomes a band between the two boundaries. Triangles
/// that would reuse a shared vertex are dropped, so a face whose corners
/// are all shared contributes nothing.
pub(crate) fn push_joint(geometry: &mut Geometry, end: &ResolvedCorners, start: &ResolvedCorners) {
    for (from, to) in FACES {
        let quad = [end.get(from), start.get(from), start.get(to), end.get(to)];
        for [a, b, c] in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
            if a != b && b != c && a != c {
                geometry.push_triangle(a, b, c);
            }
        }
    }
}
