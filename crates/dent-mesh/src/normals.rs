//! Face and vertex normals.

use nalgebra::Vector3;
use tracing::debug;

use crate::Mesh;
use crate::error::{MeshError, MeshResult};
use crate::validate::validate_mesh_data;

/// Unit normal for each face, in face order. Degenerate faces get a zero
/// vector; faces with out-of-range indices are treated as degenerate.
pub fn face_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    (0..mesh.faces.len())
        .map(|idx| {
            mesh.triangle(idx)
                .and_then(|tri| tri.normal())
                .unwrap_or_else(Vector3::zeros)
        })
        .collect()
}

/// Area-weighted accumulation of face normals per vertex (not normalized).
fn accumulate(mesh: &Mesh) -> Vec<Vector3<f64>> {
    let mut accum = vec![Vector3::zeros(); mesh.vertices.len()];
    for (face, tri) in mesh.faces.iter().zip(mesh.triangles()) {
        // Length is twice the area, which gives the weighting.
        let weighted = tri.normal_unnormalized();
        for &v in face {
            accum[v as usize] += weighted;
        }
    }
    accum
}

/// Area-weighted unit normal for each vertex, in vertex order.
///
/// A vertex touched by no non-degenerate face gets a zero vector. Errors on
/// an empty mesh or on invalid face indices.
pub fn vertex_normals(mesh: &Mesh) -> MeshResult<Vec<Vector3<f64>>> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh("cannot compute normals without faces"));
    }
    validate_mesh_data(mesh)?;

    Ok(accumulate(mesh)
        .into_iter()
        .map(|n| n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros))
        .collect())
}

/// Recompute [`Vertex::normal`](crate::Vertex) for every vertex.
///
/// Vertices without a non-degenerate adjacent face end up with `None`. The
/// mesh must already have valid indices.
pub fn compute_vertex_normals(mesh: &mut Mesh) {
    let accum = accumulate(mesh);
    for (vertex, n) in mesh.vertices.iter_mut().zip(accum) {
        vertex.normal = n.try_normalize(f64::EPSILON);
    }

    debug!("Computed vertex normals for {} vertices", mesh.vertices.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use approx::assert_relative_eq;

    fn flat_square() -> Mesh {
        let mut mesh = Mesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            mesh.vertices.push(Vertex::from_coords(x, y, 0.0));
        }
        mesh.faces.extend([[0, 1, 2], [0, 2, 3]]);
        mesh
    }

    #[test]
    fn test_flat_square_normals_point_up() {
        let mesh = flat_square();
        for n in vertex_normals(&mesh).unwrap() {
            assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        }
        for n in face_normals(&mesh) {
            assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_isolated_vertex_gets_zero_normal() {
        let mut mesh = flat_square();
        mesh.vertices.push(Vertex::from_coords(5.0, 5.0, 5.0));
        let normals = vertex_normals(&mesh).unwrap();
        assert_eq!(normals.len(), 5);
        assert_eq!(normals[4], Vector3::zeros());
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let mut mesh = flat_square();
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 4]);
        assert_eq!(face_normals(&mesh)[2], Vector3::zeros());
    }

    #[test]
    fn test_empty_mesh_errors() {
        assert!(vertex_normals(&Mesh::new()).is_err());
    }

    #[test]
    fn test_bad_index_errors() {
        let mut mesh = flat_square();
        mesh.faces.push([0, 1, 10]);
        assert!(vertex_normals(&mesh).is_err());
    }

    #[test]
    fn test_compute_vertex_normals_sets_field() {
        let mut mesh = flat_square();
        compute_vertex_normals(&mut mesh);
        assert!(mesh.vertices.iter().all(|v| v.normal.is_some()));
    }
}
