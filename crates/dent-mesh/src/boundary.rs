//! Boundary loop (outline) extraction.
//!
//! An open scan has one or more boundary loops: closed chains of edges that
//! belong to exactly one face. Loops are traced against the winding of their
//! adjacent faces, so a triangle `(loop[i], loop[i + 1], x)` is oriented
//! consistently with the surface it borders.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use crate::Mesh;
use crate::adjacency::{MeshAdjacency, edge_key};

/// A single closed boundary of the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered vertex indices; the last vertex connects back to the first.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Edges as `(v0, v1)` pairs in loop order, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Result of boundary topology analysis.
#[derive(Debug, Clone, Default)]
pub struct BoundaryAnalysis {
    /// Closed boundary loops, largest first.
    pub loops: Vec<BoundaryLoop>,
    /// Vertices touching other than two boundary edges.
    pub non_manifold_vertices: Vec<u32>,
    /// Boundary edges that could not be chained into a closed loop.
    pub orphan_edges: Vec<(u32, u32)>,
    /// Total number of boundary edges.
    pub total_boundary_edges: usize,
}

impl BoundaryAnalysis {
    /// No boundary edges at all.
    pub fn is_closed(&self) -> bool {
        self.total_boundary_edges == 0
    }

    /// Every boundary edge belongs to exactly one simple closed loop.
    pub fn is_valid(&self) -> bool {
        self.non_manifold_vertices.is_empty() && self.orphan_edges.is_empty()
    }
}

impl std::fmt::Display for BoundaryAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Boundary Analysis:")?;
        writeln!(f, "  Total boundary edges: {}", self.total_boundary_edges)?;
        writeln!(f, "  Closed loops: {}", self.loops.len())?;
        if !self.loops.is_empty() {
            let sizes: Vec<usize> = self.loops.iter().map(|l| l.edge_count()).collect();
            writeln!(f, "  Loop sizes: {:?}", sizes)?;
        }
        if !self.non_manifold_vertices.is_empty() {
            writeln!(
                f,
                "  Non-manifold boundary vertices: {:?}",
                self.non_manifold_vertices
            )?;
        }
        if !self.orphan_edges.is_empty() {
            writeln!(f, "  Orphan edges: {}", self.orphan_edges.len())?;
        }
        Ok(())
    }
}

/// Analyze the boundary topology of a mesh.
pub fn analyze_boundary(mesh: &Mesh) -> BoundaryAnalysis {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    analyze_boundary_with_adjacency(&mesh.faces, &adjacency)
}

/// Analyze boundary topology using a pre-built adjacency.
pub fn analyze_boundary_with_adjacency(
    faces: &[[u32; 3]],
    adjacency: &MeshAdjacency,
) -> BoundaryAnalysis {
    let total_boundary_edges = adjacency.boundary_edge_count();
    if total_boundary_edges == 0 {
        return BoundaryAnalysis::default();
    }

    debug!("Analyzing {} boundary edges", total_boundary_edges);

    // Directed boundary edges, reversed relative to the owning face.
    let mut next: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut degree: HashMap<u32, usize> = HashMap::new();
    for &[v0, v1, v2] in faces {
        for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
            if adjacency.faces_for_edge(a, b).map(|f| f.len()) == Some(1) {
                next.entry(b).or_default().push(a);
                *degree.entry(a).or_default() += 1;
                *degree.entry(b).or_default() += 1;
            }
        }
    }

    let mut non_manifold_vertices: Vec<u32> = degree
        .iter()
        .filter(|&(_, &d)| d != 2)
        .map(|(&v, _)| v)
        .collect();
    non_manifold_vertices.sort_unstable();

    // Deterministic start order regardless of hash iteration.
    let mut starts: Vec<u32> = next.keys().copied().collect();
    starts.sort_unstable();

    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let mut loops = Vec::new();
    let mut orphan_edges = Vec::new();

    for start in starts {
        let Some(targets) = next.get(&start) else {
            continue;
        };
        for &first in targets {
            if visited.contains(&(start, first)) {
                continue;
            }
            match trace_loop(start, first, &next, &mut visited) {
                Ok(vertices) => loops.push(BoundaryLoop { vertices }),
                Err(chain) => orphan_edges.extend(chain),
            }
        }
    }

    loops.sort_by_key(|l| std::cmp::Reverse(l.edge_count()));
    orphan_edges.sort_unstable_by_key(|&(a, b)| edge_key(a, b));

    info!(
        "Boundary analysis: {} loops, {} non-manifold vertices, {} orphan edges",
        loops.len(),
        non_manifold_vertices.len(),
        orphan_edges.len()
    );

    BoundaryAnalysis {
        loops,
        non_manifold_vertices,
        orphan_edges,
        total_boundary_edges,
    }
}

/// Follow directed boundary edges from `start -> first` until the chain
/// returns to `start`. On failure returns the edges walked so far.
fn trace_loop(
    start: u32,
    first: u32,
    next: &HashMap<u32, Vec<u32>>,
    visited: &mut HashSet<(u32, u32)>,
) -> Result<Vec<u32>, Vec<(u32, u32)>> {
    let mut vertices = vec![start];
    let mut walked = vec![(start, first)];
    visited.insert((start, first));
    let mut current = first;

    while current != start {
        let step = next
            .get(&current)
            .and_then(|targets| targets.iter().find(|&&t| !visited.contains(&(current, t))));

        match step {
            Some(&target) => {
                vertices.push(current);
                visited.insert((current, target));
                walked.push((current, target));
                current = target;
            }
            None => return Err(walked),
        }
    }

    if vertices.len() < 3 {
        return Err(walked);
    }
    Ok(vertices)
}

/// All boundary loops of the mesh, largest first. Empty for a closed mesh.
pub fn boundary_loops(mesh: &Mesh) -> Vec<BoundaryLoop> {
    analyze_boundary(mesh).loops
}

/// The mesh outline: its largest boundary loop, or `None` when closed.
pub fn boundary_loop(mesh: &Mesh) -> Option<BoundaryLoop> {
    boundary_loops(mesh).into_iter().next()
}
