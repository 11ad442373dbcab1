//! Winding order correction and normal fixing.

use hashbrown::HashSet;
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::Mesh;
use crate::adjacency::MeshAdjacency;
use crate::error::MeshResult;
use crate::normals::compute_vertex_normals;
use crate::validate::validate_mesh_data;

/// Make face winding consistent within each connected component.
///
/// BFS flood fill from the lowest-numbered unvisited face of each component;
/// that face keeps its orientation and every neighbor is flipped as needed so
/// shared edges are traversed in opposite directions.
pub fn fix_winding_order(mesh: &mut Mesh) -> MeshResult<()> {
    if mesh.faces.is_empty() {
        return Ok(());
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let face_count = mesh.faces.len();

    let mut visited: HashSet<u32> = HashSet::with_capacity(face_count);
    let mut flipped: HashSet<u32> = HashSet::new();
    let mut component_count = 0;

    for start_face in 0..face_count as u32 {
        if !visited.insert(start_face) {
            continue;
        }
        component_count += 1;

        let mut queue = VecDeque::from([start_face]);
        while let Some(face_idx) = queue.pop_front() {
            let face = mesh.faces[face_idx as usize];
            let face_flipped = flipped.contains(&face_idx);

            for i in 0..3 {
                let (v0, v1) = (face[i], face[(i + 1) % 3]);
                let Some(neighbors) = adjacency.faces_for_edge(v0, v1) else {
                    continue;
                };

                for &neighbor_idx in neighbors {
                    if !visited.insert(neighbor_idx) {
                        continue;
                    }

                    // Same traversal direction on a shared edge means the two
                    // faces disagree; the flip decision is relative to whether
                    // the current face is itself being flipped.
                    let same_dir = edge_direction_in_face(&mesh.faces[neighbor_idx as usize], v0, v1)
                        .unwrap_or(false);
                    if same_dir != face_flipped {
                        flipped.insert(neighbor_idx);
                    }
                    queue.push_back(neighbor_idx);
                }
            }
        }
    }

    for &face_idx in &flipped {
        mesh.faces[face_idx as usize].swap(1, 2);
    }

    if flipped.is_empty() {
        debug!(
            "Winding order already consistent across {} component(s)",
            component_count
        );
    } else {
        info!(
            "Fixed winding order: flipped {} faces across {} component(s)",
            flipped.len(),
            component_count
        );
    }

    Ok(())
}

/// `Some(true)` if the face traverses `a -> b`, `Some(false)` for `b -> a`,
/// `None` if the edge is not part of the face.
pub(crate) fn edge_direction_in_face(face: &[u32; 3], a: u32, b: u32) -> Option<bool> {
    (0..3).find_map(|i| {
        let (v0, v1) = (face[i], face[(i + 1) % 3]);
        if v0 == a && v1 == b {
            Some(true)
        } else if v0 == b && v1 == a {
            Some(false)
        } else {
            None
        }
    })
}

/// Make the mesh's orientation consistent and outward, then recompute normals.
///
/// 1. Consistent winding per component ([`fix_winding_order`]).
/// 2. For a watertight mesh with negative signed volume, flip every face.
/// 3. Recompute area-weighted vertex normals into [`Vertex::normal`](crate::Vertex).
///
/// Open meshes keep the orientation of their first face per component.
pub fn fix_normals(mesh: &mut Mesh) -> MeshResult<()> {
    validate_mesh_data(mesh)?;
    fix_winding_order(mesh)?;

    if MeshAdjacency::build(&mesh.faces).is_watertight() && mesh.is_inside_out() {
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        info!("Mesh was inside-out, flipped {} faces", mesh.faces.len());
    }

    compute_vertex_normals(mesh);
    Ok(())
}
