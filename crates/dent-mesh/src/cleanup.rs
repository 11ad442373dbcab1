//! Face-level cleanup: duplicate and degenerate triangle removal.

use hashbrown::HashSet;
use tracing::info;

use crate::{Mesh, Triangle};

/// Default area below which a triangle counts as degenerate.
pub const DEFAULT_DEGENERATE_AREA: f64 = 1e-10;

/// Rotate the smallest index to the front, keeping cyclic order.
fn canonical_face(face: [u32; 3]) -> [u32; 3] {
    let min_idx = (0..3).min_by_key(|&i| face[i]).unwrap_or(0);
    [face[min_idx], face[(min_idx + 1) % 3], face[(min_idx + 2) % 3]]
}

/// Remove faces that repeat an earlier face's vertex set.
///
/// Winding and starting vertex are ignored, so `[0, 1, 2]`, `[1, 2, 0]` and
/// `[0, 2, 1]` are all the same face. The first occurrence is kept.
/// Returns the number of faces removed.
pub fn remove_duplicate_faces(mesh: &mut Mesh) -> usize {
    let original_count = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(original_count);

    mesh.faces.retain(|&face| {
        let fwd = canonical_face(face);
        let rev = canonical_face([face[0], face[2], face[1]]);
        if seen.contains(&fwd) || seen.contains(&rev) {
            false
        } else {
            seen.insert(fwd);
            true
        }
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        info!("Removed {} duplicate faces", removed);
    }
    removed
}

/// Remove triangles with area below `area_threshold`.
///
/// Faces referencing missing vertices are removed as well. Vertices are left
/// in place, even if no face references them afterwards.
/// Returns the number of triangles removed.
pub fn remove_degenerate_triangles(mesh: &mut Mesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();
    let vertices = &mesh.vertices;

    mesh.faces.retain(|&[i0, i1, i2]| {
        let corners = (
            vertices.get(i0 as usize),
            vertices.get(i1 as usize),
            vertices.get(i2 as usize),
        );
        match corners {
            (Some(a), Some(b), Some(c)) => {
                Triangle::new(a.position, b.position, c.position).area() >= area_threshold
            }
            _ => false,
        }
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        info!(
            "Removed {} degenerate triangles (area < {:e})",
            removed, area_threshold
        );
    }
    removed
}
