//! End-to-end and property tests for the modeling operations.
//!
//! Run with: cargo test -p dent-model

use std::f64::consts::PI;

use approx::assert_relative_eq;
use dent_mesh::{Mesh, Vertex};
use dent_model::{
    MarginParams, ModelErrorCode, ModelInfo, ModelingConfig, OrientationRequest, RefineParams,
    SolidifyBuilder, apply_orientation, detect_margin, export_pts, orient, positions, pts_file_name,
    refine_margin, refine_points, solidify,
};
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn cube(size: f64) -> Mesh {
    let corners = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ];
    Mesh::from_parts(
        corners.iter().map(|&(x, y, z)| Point3::new(x * size, y * size, z * size)),
        vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

/// Open cup: a low center vertex fanned to `rim` vertices on a circle of
/// radius 5 at z = 2. The rim is both the boundary and the margin. Rim
/// angles sit a quarter step off the X axis.
fn cup(rim: usize) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    for k in 0..rim {
        let a = 2.0 * PI * (k as f64 + 0.25) / rim as f64;
        mesh.vertices.push(Vertex::from_coords(5.0 * a.cos(), 5.0 * a.sin(), 2.0));
    }
    for k in 0..rim as u32 {
        mesh.faces.push([0, 1 + k, 1 + (k + 1) % rim as u32]);
    }
    mesh
}

/// Flat `n x n` grid at z = 1.
fn flat_grid(n: u32) -> Mesh {
    let mut mesh = Mesh::new();
    for y in 0..=n {
        for x in 0..=n {
            mesh.vertices.push(Vertex::from_coords(x as f64, y as f64, 1.0));
        }
    }
    let row = n + 1;
    for y in 0..n {
        for x in 0..n {
            let i = y * row + x;
            mesh.faces.push([i, i + 1, i + row + 1]);
            mesh.faces.push([i, i + row + 1, i + row]);
        }
    }
    mesh
}

fn angles_about_centroid(points: &[Point3<f64>]) -> Vec<f64> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    points.iter().map(|p| (p.y - cy).atan2(p.x - cx)).collect()
}

// =============================================================================
// Workflows
// =============================================================================

#[test]
fn test_default_preset_leaves_vertices_unchanged() {
    let original = cube(3.0);
    let mut mesh = original.clone();
    let config = ModelingConfig::default();
    orient(&mut mesh, &OrientationRequest::preset("default"), &config.presets).unwrap();

    for (a, b) in mesh.vertices.iter().zip(&original.vertices) {
        assert_relative_eq!(a.position, b.position, epsilon = 1e-12);
    }
    assert_eq!(mesh.faces, original.faces);
}

#[test]
fn test_occlusal_down_twice_restores() {
    let original = cube(3.0);
    let mut mesh = original.clone();
    let config = ModelingConfig::default();
    let request = OrientationRequest::preset("occlusalDown");

    orient(&mut mesh, &request, &config.presets).unwrap();
    assert_relative_eq!(mesh.vertices[6].position.z, -3.0, epsilon = 1e-9);
    orient(&mut mesh, &request, &config.presets).unwrap();

    for (a, b) in mesh.vertices.iter().zip(&original.vertices) {
        assert_relative_eq!(a.position, b.position, epsilon = 1e-9);
    }
}

#[test]
fn test_unknown_orientation_rejected() {
    let mut mesh = cube(1.0);
    let config = ModelingConfig::default();
    let err = orient(&mut mesh, &OrientationRequest::preset("upsideDown"), &config.presets).unwrap_err();
    assert_eq!(err.code(), ModelErrorCode::InvalidOrientation);
}

#[test]
fn test_watertight_solidify_doubles_vertices() {
    let input = cube(10.0);
    let solid = solidify(&input, &Default::default()).unwrap();

    assert_eq!(solid.stats.outer_faces, input.face_count());
    assert_eq!(solid.mesh.vertex_count(), 2 * input.vertex_count());
    assert_eq!(solid.stats.stitch_faces, 0);
    assert!(solid.stats.watertight);
}

#[test]
fn test_open_cup_solidifies_through_stl() {
    let dir = tempfile::tempdir().unwrap();
    let scan_path = dir.path().join("cup.stl");
    let solid_path = dir.path().join("cup_solid.stl");
    cup(16).save(&scan_path).unwrap();

    let scan = Mesh::load(&scan_path).unwrap();
    let solid = SolidifyBuilder::new(&scan).thickness(0.5).build().unwrap();
    assert!(solid.stats.solidified_fully);
    assert!(solid.stats.watertight);
    assert_eq!(solid.stats.boundary_loops, 1);
    assert_eq!(solid.stats.boundary_edges, 16);
    solid.mesh.save(&solid_path).unwrap();

    let reloaded = Mesh::load(&solid_path).unwrap();
    let info = ModelInfo::from_mesh(&reloaded).unwrap();
    assert_eq!(info.vertices, 34);
    assert!(info.watertight);
    assert!(info.volume.unwrap() > 0.0);
}

#[test]
fn test_margin_to_pts_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = ModelingConfig::default();
    let mesh = cup(24);

    let detected = detect_margin(&mesh, &config.margin).unwrap();
    assert_eq!(detected.len(), 24);
    let refined = refine_margin(&detected, &config.refine).unwrap();
    assert_eq!(refined.len(), 24);

    let doc = export_pts(&positions(&refined), "1042", "36").unwrap();
    let path = dir.path().join(pts_file_name("1042", "36"));
    std::fs::write(&path, &doc).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "# Margin Points for Case 1042");
    assert_eq!(lines[3], "# Point Count: 24");
    assert_eq!(lines[4], "");
    assert_eq!(lines.len(), 5 + 24);
    for line in &lines[5..] {
        let coords: Vec<f64> = line.split(' ').map(|c| c.parse().unwrap()).collect();
        assert_eq!(coords.len(), 3);
        assert_relative_eq!(coords[2], 2.0, epsilon = 1e-6);
    }
}

#[test]
fn test_pts_deterministic_except_timestamp() {
    let points = positions(&detect_margin(&cup(10), &MarginParams::default()).unwrap());
    let a = export_pts(&points, "7", "21").unwrap();
    let b = export_pts(&points, "7", "21").unwrap();

    let strip = |doc: &str| -> Vec<String> {
        doc.lines()
            .filter(|l| !l.starts_with("# Generated: "))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(strip(&a), strip(&b));
    assert_eq!(a.lines().count(), b.lines().count());
}

#[test]
fn test_flat_mesh_has_no_margin() {
    let err = detect_margin(&flat_grid(6), &MarginParams::default()).unwrap_err();
    assert_eq!(err.code(), ModelErrorCode::NoMarginCandidates);
}

#[test]
fn test_refine_extremes() {
    let points = positions(&detect_margin(&cup(12), &MarginParams::default()).unwrap());
    let n = points.len() as f64;
    let centroid = points.iter().fold(Point3::origin(), |acc, p| acc + p.coords / n);

    for p in refine_points(&points, 1e9).unwrap() {
        assert_relative_eq!(p, centroid, epsilon = 1e-9);
    }
    for (p, q) in refine_points(&points, 1e-3).unwrap().iter().zip(&points) {
        assert_relative_eq!(p, q, epsilon = 1e-12);
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_detect_bounded_and_angle_ordered(rim in 3usize..60, density in 1usize..80) {
        let mesh = cup(rim);
        let params = MarginParams { height_offset: 0.0, density, ..Default::default() };
        let points = positions(&detect_margin(&mesh, &params).unwrap());

        prop_assert_eq!(points.len(), rim.min(density));
        if points.len() >= 3 {
            let angles = angles_about_centroid(&points);
            prop_assert!(angles.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn prop_refine_preserves_count(
        coords in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0, -50.0f64..50.0), 0..40),
        smoothness in 0.1f64..50.0,
    ) {
        let points: Vec<Point3<f64>> = coords.iter().map(|&(x, y, z)| Point3::new(x, y, z)).collect();
        let refined = refine_points(&points, smoothness).unwrap();
        prop_assert_eq!(refined.len(), points.len());
        prop_assert!(refined.iter().all(|p| p.coords.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn prop_rotation_preserves_volume(
        rx in -360.0f64..360.0,
        ry in -360.0f64..360.0,
        rz in -360.0f64..360.0,
    ) {
        let mut mesh = cube(2.0);
        apply_orientation(&mut mesh, [rx, ry, rz]).unwrap();
        prop_assert_eq!(mesh.vertex_count(), 8);
        prop_assert!((mesh.signed_volume() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn prop_refined_margin_confidence(smoothness in 0.5f64..20.0) {
        let detected = detect_margin(&cup(20), &MarginParams::default()).unwrap();
        let refined = refine_margin(&detected, &RefineParams { smoothness }).unwrap();
        prop_assert!(refined.iter().all(|p| p.confidence == dent_model::REFINED_CONFIDENCE));
    }
}
