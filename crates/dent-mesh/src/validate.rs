//! Structural validation of raw mesh data.

use crate::Mesh;
use crate::error::{MeshError, MeshResult};

/// Reject meshes whose data cannot be processed safely.
///
/// Fails on the first NaN or infinite coordinate, or the first face index that
/// does not reference an existing vertex. Topology (watertightness, manifold
/// edges) is not checked here.
pub fn validate_mesh_data(mesh: &Mesh) -> MeshResult<()> {
    for (vertex_index, vertex) in mesh.vertices.iter().enumerate() {
        let p = vertex.position;
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(MeshError::InvalidCoordinate {
                    vertex_index,
                    coordinate,
                    value,
                });
            }
        }
    }

    let vertex_count = mesh.vertices.len();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&idx| idx as usize >= vertex_count) {
            return Err(MeshError::invalid_vertex_index(face_index, bad, vertex_count));
        }
    }

    Ok(())
}
