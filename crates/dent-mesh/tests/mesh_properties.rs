//! Integration and property tests for the mesh geometry layer.
//!
//! Run with: cargo test -p dent-mesh

use dent_mesh::{
    Mesh, MeshAdjacency, Vertex, analyze_boundary, face_normals, fill_holes_with_max_edges,
    fix_normals, load_stl_bytes, remove_degenerate_triangles, remove_duplicate_faces,
    save_stl_bytes, validate_mesh_data, vertex_normals,
};
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn cube(size: f64) -> Mesh {
    let mut mesh = Mesh::new();
    for &(x, y, z) in &[
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ] {
        mesh.vertices.push(Vertex::from_coords(x * size, y * size, z * size));
    }
    mesh.faces = vec![
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
    ];
    mesh
}

/// Cube with the top (z = size) face pair removed.
fn open_cube(size: f64) -> Mesh {
    let mut mesh = cube(size);
    mesh.faces.retain(|f| *f != [4, 5, 6] && *f != [4, 6, 7]);
    mesh
}

// =============================================================================
// Workflows
// =============================================================================

#[test]
fn test_cube_measurements() {
    let mesh = cube(2.0);
    assert!(mesh.is_watertight());
    assert!((mesh.volume() - 8.0).abs() < 1e-9);
    assert!((mesh.surface_area() - 24.0).abs() < 1e-9);
}

#[test]
fn test_open_cube_outline_and_repair() {
    let mut mesh = open_cube(10.0);
    assert!(!mesh.is_watertight());

    let outline = mesh.boundary_loop().unwrap();
    assert_eq!(outline.edge_count(), 4);

    let filled = fill_holes_with_max_edges(&mut mesh, 4).unwrap();
    assert_eq!(filled, 1);
    fix_normals(&mut mesh).unwrap();

    assert!(mesh.is_watertight());
    assert!((mesh.signed_volume() - 1000.0).abs() < 1e-6);
}

#[test]
fn test_stl_round_trip_keeps_topology() {
    let mesh = cube(5.0);
    let loaded = load_stl_bytes(&save_stl_bytes(&mesh).unwrap()).unwrap();

    assert_eq!(loaded.vertex_count(), 8);
    assert_eq!(loaded.face_count(), 12);
    assert!(loaded.is_watertight());
    assert!((loaded.volume() - 125.0).abs() < 1e-4);
}

#[test]
fn test_stl_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crown.stl");

    open_cube(3.0).save(&path).unwrap();
    let loaded = Mesh::load(&path).unwrap();

    assert_eq!(loaded.face_count(), 10);
    assert_eq!(analyze_boundary(&loaded).loops.len(), 1);
}

#[test]
fn test_vertex_normals_point_outward_on_cube() {
    let mesh = cube(1.0);
    let center = nalgebra::Point3::new(0.5, 0.5, 0.5);
    for (v, n) in mesh.vertices.iter().zip(vertex_normals(&mesh).unwrap()) {
        assert!((n.norm() - 1.0).abs() < 1e-9);
        assert!(n.dot(&(v.position - center)) > 0.0);
    }
}

// =============================================================================
// Properties
// =============================================================================

fn arb_mesh(max_vertices: usize, max_faces: usize) -> impl Strategy<Value = Mesh> {
    (3..=max_vertices).prop_flat_map(move |n| {
        let verts = prop::collection::vec(prop::array::uniform3(-50.0..50.0f64), n);
        let faces = prop::collection::vec(prop::array::uniform3(0..n as u32), 1..=max_faces);
        (verts, faces).prop_map(|(verts, faces)| Mesh {
            vertices: verts
                .into_iter()
                .map(|[x, y, z]| Vertex::from_coords(x, y, z))
                .collect(),
            faces,
        })
    })
}

proptest! {
    #[test]
    fn prop_random_meshes_validate(mesh in arb_mesh(20, 40)) {
        prop_assert!(validate_mesh_data(&mesh).is_ok());
    }

    #[test]
    fn prop_vertex_normals_unit_or_zero(mesh in arb_mesh(20, 40)) {
        let normals = vertex_normals(&mesh).unwrap();
        prop_assert_eq!(normals.len(), mesh.vertex_count());
        for n in normals {
            let len = n.norm();
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_face_normals_match_face_count(mesh in arb_mesh(20, 40)) {
        prop_assert_eq!(face_normals(&mesh).len(), mesh.face_count());
    }

    #[test]
    fn prop_duplicate_removal_is_idempotent(mesh in arb_mesh(10, 60)) {
        let mut once = mesh.clone();
        remove_duplicate_faces(&mut once);
        let mut twice = once.clone();
        prop_assert_eq!(remove_duplicate_faces(&mut twice), 0);
        prop_assert_eq!(once.faces, twice.faces);
    }

    #[test]
    fn prop_degenerate_removal_leaves_vertices(mesh in arb_mesh(10, 30)) {
        let mut cleaned = mesh.clone();
        remove_degenerate_triangles(&mut cleaned, 1e-10);
        prop_assert_eq!(cleaned.vertex_count(), mesh.vertex_count());
        prop_assert!(cleaned.triangles().all(|t| t.area() >= 1e-10));
    }

    #[test]
    fn prop_fix_normals_makes_scaled_cube_positive(size in 0.1..100.0f64, flip_mask in 0u16..4096) {
        let mut mesh = cube(size);
        for (i, face) in mesh.faces.iter_mut().enumerate() {
            if flip_mask & (1 << i) != 0 {
                face.swap(1, 2);
            }
        }
        fix_normals(&mut mesh).unwrap();
        prop_assert!(mesh.signed_volume() > 0.0);
        prop_assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
    }
}
