//! End-to-end tests for loading layered toolpaths into preview volumes.
//!
//! Run with: cargo test -p preview-toolpaths --test preview_loader

use nalgebra::{Point2, Vector2};
use preview_toolpaths::{
    ExtrusionEntityCollection, ExtrusionLoop, ExtrusionMultiPath, ExtrusionPath, LayerToolpaths,
    PreviewConfig, TessellateError, ToolpathRole, ToolpathVolume, load_layer_toolpaths,
    validate_geometry,
};

const LAYER_HEIGHT: f64 = 0.2;
const WIDTH: f64 = 0.45;

// =============================================================================
// Fixtures
// =============================================================================

fn path(points: &[(f64, f64)]) -> ExtrusionPath {
    ExtrusionPath::new(
        points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        WIDTH,
        LAYER_HEIGHT,
    )
}

/// A 10 mm square perimeter split into two paths meeting at opposite corners.
fn perimeter() -> ExtrusionLoop {
    ExtrusionLoop {
        paths: vec![
            path(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            path(&[(10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
        ],
    }
}

/// A two-pass zigzag inside the perimeter.
fn infill() -> ExtrusionMultiPath {
    ExtrusionMultiPath {
        paths: vec![
            path(&[(1.0, 1.0), (9.0, 1.0), (9.0, 2.0)]),
            path(&[(9.0, 2.0), (1.0, 2.0)]),
        ],
    }
}

/// Two loose support strokes.
fn support() -> ExtrusionEntityCollection {
    ExtrusionEntityCollection {
        entities: vec![
            path(&[(12.0, 0.0), (12.0, 10.0)]).into(),
            path(&[(13.0, 0.0), (13.0, 10.0)]).into(),
        ],
    }
}

fn layer(print_z: f64) -> LayerToolpaths {
    LayerToolpaths::new(print_z)
        .with(ToolpathRole::Perimeter, perimeter())
        .with(ToolpathRole::Infill, infill())
        .with(ToolpathRole::Support, support())
}

/// Three layers, deliberately out of order.
fn layers() -> Vec<LayerToolpaths> {
    vec![layer(0.6), layer(0.2), layer(0.4)]
}

fn volume(volumes: &[ToolpathVolume], role: ToolpathRole) -> &ToolpathVolume {
    volumes.iter().find(|v| v.role == role).unwrap()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn one_volume_per_used_role() {
    let volumes = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();

    assert_eq!(volumes.len(), 3);
    assert!(volumes.iter().all(|v| v.role != ToolpathRole::Skirt));
    for v in &volumes {
        assert_eq!(v.color, v.role.color());
    }
}

#[test]
fn every_volume_is_a_closed_surface() {
    let volumes = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();

    for v in &volumes {
        let report = validate_geometry(&v.geometry);
        assert!(report.is_watertight(), "{:?}: {report}", v.role);
        assert!(report.is_consistently_wound(), "{:?}: {report}", v.role);
        assert!(report.signed_volume > 0.0);
    }
}

#[test]
fn loops_chains_and_collections_keep_their_shape() {
    let volumes = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();

    // Three stitched square loops
    let walls = validate_geometry(&volume(&volumes, ToolpathRole::Perimeter).geometry);
    assert_eq!(walls.vertex_count, 3 * 20);
    assert_eq!(walls.euler_characteristic(), 0);

    // Three open zigzags, one closed tube each
    let fill = validate_geometry(&volume(&volumes, ToolpathRole::Infill).geometry);
    assert_eq!(fill.euler_characteristic(), 3 * 2);

    // Two strokes per layer
    let support = validate_geometry(&volume(&volumes, ToolpathRole::Support).geometry);
    assert_eq!(support.vertex_count, 3 * 2 * 8);
    assert_eq!(support.euler_characteristic(), 3 * 2 * 2);
}

#[test]
fn layers_are_recorded_bottom_up() {
    let volumes = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();

    for v in &volumes {
        assert_eq!(v.print_zs, vec![0.2, 0.4, 0.6]);
        assert_eq!(v.offsets[0], 0);
        assert!(v.offsets.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn copies_repeat_every_entity() {
    let copies = [Vector2::new(0.0, 0.0), Vector2::new(30.0, 0.0)];
    let single = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();
    let double = load_layer_toolpaths(&layers(), &copies, &PreviewConfig::default()).unwrap();

    for role in [ToolpathRole::Perimeter, ToolpathRole::Infill, ToolpathRole::Support] {
        let one = &volume(&single, role).geometry;
        let two = &volume(&double, role).geometry;
        assert_eq!(two.vertex_count(), 2 * one.vertex_count());
        assert_eq!(two.triangle_count(), 2 * one.triangle_count());
    }

    let walls = volume(&double, ToolpathRole::Perimeter).bounds();
    assert!(walls.min.x < 0.0);
    assert!(walls.max.x > 40.0);
}

// =============================================================================
// Layer Ranges
// =============================================================================

#[test]
fn visible_range_selects_one_layer() {
    let volumes = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();
    let walls = volume(&volumes, ToolpathRole::Perimeter);

    let range = walls.visible_range(0.4, 0.4);
    assert!(!range.is_empty());
    assert_eq!(range.len() % 3, 0);

    for &index in &walls.geometry.indices[range] {
        let z = walls.geometry.position(index as usize).unwrap().z;
        assert!(z > 0.4 - LAYER_HEIGHT - 1e-5 && z < 0.4 + 1e-5, "z = {z}");
    }
}

#[test]
fn visible_range_spanning_all_layers_is_everything() {
    let volumes = load_layer_toolpaths(&layers(), &[], &PreviewConfig::default()).unwrap();

    for v in &volumes {
        assert_eq!(v.visible_range(0.0, 10.0), 0..v.geometry.indices.len());
        assert!(v.visible_range(5.0, 10.0).is_empty());
    }
}

// =============================================================================
// Volume Splitting
// =============================================================================

#[test]
fn large_volumes_split_between_layers() {
    let config = PreviewConfig::default().with_max_vertices_per_volume(30);
    let volumes = load_layer_toolpaths(&layers(), &[], &config).unwrap();

    let walls: Vec<&ToolpathVolume> = volumes
        .iter()
        .filter(|v| v.role == ToolpathRole::Perimeter)
        .collect();
    assert_eq!(walls.len(), 2);
    assert_eq!(walls[0].print_zs, vec![0.2, 0.4]);
    assert_eq!(walls[1].print_zs, vec![0.6]);

    for v in &volumes {
        let report = validate_geometry(&v.geometry);
        assert!(report.is_watertight(), "{report}");
        assert_eq!(v.offsets[0], 0);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn invalid_entity_fails_the_load() {
    let bad = ExtrusionPath::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], -1.0, 0.2);
    let layers = vec![layer(0.2), LayerToolpaths::new(0.4).with(ToolpathRole::Infill, bad)];

    let err = load_layer_toolpaths(&layers, &[], &PreviewConfig::default()).unwrap_err();
    assert!(matches!(err, TessellateError::InvalidWidth { index: 0, .. }));
}

#[test]
fn no_layers_no_volumes() {
    let volumes = load_layer_toolpaths(&[], &[], &PreviewConfig::default()).unwrap();
    assert!(volumes.is_empty());
}
