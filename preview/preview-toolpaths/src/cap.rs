//! End caps closing the tube at open ends and elevation steps.

use preview_types::Geometry;

use crate::corner::ResolvedCorners;

/// Close the start of a tube section, facing against the direction of travel.
pub(crate) fn push_leading_cap(geometry: &mut Geometry, corners: &ResolvedCorners) {
    geometry.push_quad(corners.bottom, corners.right, corners.top, corners.left);
}

/// Close the end of a tube section, facing along the direction of travel.
pub(crate) fn push_trailing_cap(geometry: &mut Geometry, corners: &ResolvedCorners) {
    geometry.push_quad(corners.bottom, corners.left, corners.top, corners.right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use preview_types::{Line2, Point2};

    use crate::corner::CornerIndices;
    use crate::frame::CrossSection;

    fn corners_at_start_and_end() -> (Geometry, ResolvedCorners, ResolvedCorners) {
        let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let section = CrossSection::planar(&line, 0.2, 1.0, 0.2);
        let mut geometry = Geometry::new();

        let mut start = CornerIndices::default();
        start.allocate_missing(&mut geometry, |c| section.corner(&section.start, c));
        let mut end = CornerIndices::default();
        end.allocate_missing(&mut geometry, |c| section.corner(&section.end, c));

        (geometry, start.resolve().unwrap(), end.resolve().unwrap())
    }

    #[test]
    fn leading_cap_faces_backwards() {
        let (mut geometry, start, _) = corners_at_start_and_end();
        push_leading_cap(&mut geometry, &start);

        for i in 0..2 {
            let normal = geometry.triangle_positions(i).unwrap().normal().unwrap();
            assert_relative_eq!(normal.x, -1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn trailing_cap_faces_forwards() {
        let (mut geometry, _, end) = corners_at_start_and_end();
        push_trailing_cap(&mut geometry, &end);

        for i in 0..2 {
            let normal = geometry.triangle_positions(i).unwrap().normal().unwrap();
            assert_relative_eq!(normal.x, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn cap_area_is_diamond() {
        let (mut geometry, start, _) = corners_at_start_and_end();
        push_leading_cap(&mut geometry, &start);
        assert_relative_eq!(geometry.surface_area(), 0.5 * 1.0 * 0.2, epsilon = 1e-6);
    }
}
