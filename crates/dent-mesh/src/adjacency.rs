//! Edge adjacency for topology queries.

use hashbrown::HashMap;

/// Canonical key for an undirected edge: `(min, max)`.
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// Lightweight topology structure for mesh queries.
///
/// Maps each undirected edge to the faces that use it, without building a
/// full half-edge structure.
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    /// Maps canonical edge (min, max) → face indices that share this edge.
    pub edge_to_faces: HashMap<(u32, u32), Vec<u32>>,
}

impl MeshAdjacency {
    /// Build adjacency structures from a face list.
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut adjacency = Self::default();

        for (face_idx, &[v0, v1, v2]) in faces.iter().enumerate() {
            let face_idx = face_idx as u32;

            for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
                adjacency
                    .edge_to_faces
                    .entry(edge_key(a, b))
                    .or_default()
                    .push(face_idx);
            }
        }

        adjacency
    }

    /// Every edge is shared by exactly two faces.
    ///
    /// An empty face list is not watertight.
    pub fn is_watertight(&self) -> bool {
        !self.edge_to_faces.is_empty() && self.edge_to_faces.values().all(|faces| faces.len() == 2)
    }

    /// Count boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Get faces adjacent to an edge, in either direction.
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[u32]> {
        self.edge_to_faces.get(&edge_key(v0, v1)).map(|v| v.as_slice())
    }
}
