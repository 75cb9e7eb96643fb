//! Cross-section frames along a toolpath.
//!
//! Every segment carries an orthonormal frame (tangent, right, up) and the
//! dimensions of its diamond-shaped cross-section. The four corners sit at
//! half the height along `±up` and half the width along `±right`.

use nalgebra::{Point3, Vector3};
use preview_types::{Line2, Line3};

use crate::corner::Corner;

/// The frame and cross-section of one segment.
#[derive(Debug, Clone, Copy)]
pub struct CrossSection {
    /// Centerline start, in the middle of the cross-section.
    pub start: Point3<f64>,
    /// Centerline end.
    pub end: Point3<f64>,
    /// Unit direction of travel.
    pub tangent: Vector3<f64>,
    /// Unit vector to the right of travel.
    pub right: Vector3<f64>,
    /// Unit vector towards the top corner.
    pub up: Vector3<f64>,
    /// Cross-section width.
    pub width: f64,
    /// Cross-section height.
    pub height: f64,
    /// Segment length.
    pub length: f64,
}

impl CrossSection {
    /// Frame of a planar segment whose top lies at `top_z`.
    ///
    /// The centerline runs at `top_z - height / 2`, so the top corner is at
    /// `top_z` and the bottom corner at `top_z - height`. The segment must
    /// have a non-zero length.
    ///
    /// # Example
    ///
    /// ```
    /// use preview_toolpaths::CrossSection;
    /// use preview_types::{Line2, Point2};
    ///
    /// let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
    /// let section = CrossSection::planar(&line, 0.2, 1.0, 0.2);
    ///
    /// assert!((section.start.z - 0.1).abs() < 1e-12);
    /// assert!((section.right.y + 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn planar(line: &Line2, top_z: f64, width: f64, height: f64) -> Self {
        let middle_z = top_z - 0.5 * height;
        let length = line.length();
        let direction = line.vector() / length;

        Self {
            start: Point3::new(line.a.x, line.a.y, middle_z),
            end: Point3::new(line.b.x, line.b.y, middle_z),
            tangent: Vector3::new(direction.x, direction.y, 0.0),
            right: Vector3::new(direction.y, -direction.x, 0.0),
            up: Vector3::z(),
            width,
            height,
            length,
        }
    }

    /// Frame of a segment in free space, centered on the segment.
    ///
    /// `right` is horizontal, perpendicular to travel. A vertical segment
    /// has no such direction; it uses `-X` when travelling up and `+X` when
    /// travelling down, which makes `up` point along `+Y` in both cases.
    #[must_use]
    pub fn spatial(line: &Line3, width: f64, height: f64) -> Self {
        let length = line.length();
        let tangent = line.vector() / length;

        let right = if line.is_vertical() {
            if tangent.z > 0.0 {
                -Vector3::x()
            } else {
                Vector3::x()
            }
        } else {
            tangent.cross(&Vector3::z()).normalize()
        };
        let up = right.cross(&tangent).normalize();

        Self {
            start: line.a,
            end: line.b,
            tangent,
            right,
            up,
            width,
            height,
            length,
        }
    }

    /// Turn this frame about its tangent to carry on from `prev`'s frame.
    ///
    /// `prev`'s `right` is carried over by the smallest rotation taking its
    /// tangent onto this one. The frame is left alone when it already
    /// agrees, so runs that never leave a plane keep their horizontal
    /// `right`.
    pub(crate) fn follow(&mut self, prev: &Self) {
        let carried = transport(&prev.right, &prev.tangent, &self.tangent, &prev.up);
        let Some(right) = (carried - self.tangent * self.tangent.dot(&carried)).try_normalize(1e-12)
        else {
            return;
        };
        if right.dot(&self.right) < 1.0 - 1e-9 {
            self.right = right;
            self.up = right.cross(&self.tangent).normalize();
        }
    }

    /// Outward normal of a corner.
    #[must_use]
    pub fn corner_normal(&self, corner: Corner) -> Vector3<f64> {
        match corner {
            Corner::Top => self.up,
            Corner::Bottom => -self.up,
            Corner::Left => -self.right,
            Corner::Right => self.right,
        }
    }

    /// Position and normal of a corner around the centerline point `center`.
    #[must_use]
    pub fn corner(&self, center: &Point3<f64>, corner: Corner) -> (Point3<f64>, Vector3<f64>) {
        let normal = self.corner_normal(corner);
        let half = match corner {
            Corner::Top | Corner::Bottom => 0.5 * self.height,
            Corner::Left | Corner::Right => 0.5 * self.width,
        };
        (center + normal * half, normal)
    }
}

/// Rotate `v` by the smallest rotation taking unit `from` onto unit `to`.
///
/// Opposite directions turn half way round `axis` instead.
fn transport(
    v: &Vector3<f64>,
    from: &Vector3<f64>,
    to: &Vector3<f64>,
    axis: &Vector3<f64>,
) -> Vector3<f64> {
    let cos = from.dot(to);
    if 1.0 + cos < 1e-12 {
        return axis * (2.0 * axis.dot(v)) - v;
    }
    let sin_axis = from.cross(to);
    v * cos + sin_axis.cross(v) + sin_axis * (sin_axis.dot(v) / (1.0 + cos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn planar_x() -> CrossSection {
        let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        CrossSection::planar(&line, 0.2, 1.0, 0.2)
    }

    #[test]
    fn planar_corners_span_layer() {
        let section = planar_x();
        let (top, top_n) = section.corner(&section.start, Corner::Top);
        let (bottom, _) = section.corner(&section.start, Corner::Bottom);
        let (left, left_n) = section.corner(&section.end, Corner::Left);
        let (right, _) = section.corner(&section.end, Corner::Right);

        assert_relative_eq!(top, Point3::new(0.0, 0.0, 0.2), epsilon = 1e-12);
        assert_relative_eq!(bottom, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(left, Point3::new(10.0, 0.5, 0.1), epsilon = 1e-12);
        assert_relative_eq!(right, Point3::new(10.0, -0.5, 0.1), epsilon = 1e-12);
        assert_relative_eq!(top_n, Vector3::z());
        assert_relative_eq!(left_n, Vector3::y());
    }

    #[test]
    fn planar_right_is_clockwise_perpendicular() {
        let line = Line2::new(Point2::new(1.0, 1.0), Point2::new(1.0, 4.0));
        let section = CrossSection::planar(&line, 0.3, 0.4, 0.2);
        assert_relative_eq!(section.tangent, Vector3::y());
        assert_relative_eq!(section.right, Vector3::x());
        assert_relative_eq!(section.length, 3.0);
    }

    #[test]
    fn spatial_horizontal_matches_planar() {
        let planar = planar_x();
        let line = Line3::new(Point3::new(0.0, 0.0, 0.1), Point3::new(10.0, 0.0, 0.1));
        let spatial = CrossSection::spatial(&line, 1.0, 0.2);

        assert_relative_eq!(spatial.right, planar.right, epsilon = 1e-12);
        assert_relative_eq!(spatial.up, planar.up, epsilon = 1e-12);
        assert_relative_eq!(spatial.start, planar.start, epsilon = 1e-12);
    }

    #[test]
    fn spatial_frame_is_orthonormal() {
        let line = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        let s = CrossSection::spatial(&line, 0.5, 0.3);
        assert_relative_eq!(s.tangent.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.right.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.up.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.tangent.dot(&s.right), 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.tangent.dot(&s.up), 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.right.z, 0.0, epsilon = 1e-12);
        assert!(s.up.z > 0.0);
    }

    #[test]
    fn vertical_segments_pick_axis_by_direction() {
        let rising = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0));
        let falling = Line3::new(Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 0.0));

        let up = CrossSection::spatial(&rising, 0.4, 0.2);
        assert_relative_eq!(up.right, -Vector3::x());
        assert_relative_eq!(up.up, Vector3::y());

        let down = CrossSection::spatial(&falling, 0.4, 0.2);
        assert_relative_eq!(down.right, Vector3::x());
        assert_relative_eq!(down.up, Vector3::y());
    }

    #[test]
    fn follow_keeps_a_level_frame() {
        let a = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let b = Line3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let prev = CrossSection::spatial(&a, 0.4, 0.2);
        let own = CrossSection::spatial(&b, 0.4, 0.2);

        let mut next = own;
        next.follow(&prev);
        assert_eq!(next.right, own.right);
        assert_eq!(next.up, own.up);
    }

    #[test]
    fn follow_carries_the_frame_up_a_climb() {
        let a = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        let b = Line3::new(Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        let prev = CrossSection::spatial(&a, 0.4, 0.2);
        let mut next = CrossSection::spatial(&b, 0.4, 0.2);
        assert_relative_eq!(next.right, -Vector3::x());

        next.follow(&prev);
        assert_relative_eq!(next.right, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(next.up, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn follow_turns_reversals_about_up() {
        let a = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let b = Line3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        let prev = CrossSection::spatial(&a, 0.4, 0.2);
        let mut next = CrossSection::spatial(&b, 0.4, 0.2);

        next.follow(&prev);
        assert_relative_eq!(next.right, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(next.up, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn transport_rotates_onto_target() {
        let from = Vector3::x();
        let to = Vector3::new(0.0, 1.0, 1.0).normalize();
        let moved = transport(&from, &from, &to, &Vector3::z());
        assert_relative_eq!(moved, to, epsilon = 1e-12);

        // Vectors along the rotation axis stay put.
        let axis = from.cross(&to).normalize();
        assert_relative_eq!(transport(&axis, &from, &to, &Vector3::z()), axis, epsilon = 1e-12);
    }
}
