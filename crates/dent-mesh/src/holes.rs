//! Hole filling by ear clipping.
//!
//! Holes are the boundary loops from [`crate::boundary`]. Because loops run
//! against the winding of the faces around them, a cap triangulated in loop
//! order already matches the surrounding orientation.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::boundary::{BoundaryLoop, analyze_boundary};
use crate::error::{MeshError, MeshResult};
use crate::{Mesh, Triangle};

/// Default largest hole (in edges) filled by [`fill_holes`].
pub const DEFAULT_MAX_HOLE_EDGES: usize = 100;

/// Triangulate one hole by ear clipping, falling back to a fan when no ear
/// can be found.
///
/// Returns the new faces; the mesh is not modified.
pub fn fill_hole_ear_clipping(mesh: &Mesh, hole: &BoundaryLoop) -> MeshResult<Vec<[u32; 3]>> {
    let n = hole.vertices.len();
    if n < 3 {
        return Ok(Vec::new());
    }

    let positions = hole
        .vertices
        .iter()
        .map(|&idx| {
            mesh.vertices
                .get(idx as usize)
                .map(|v| v.position)
                .ok_or_else(|| MeshError::hole_fill_failed(format!("boundary vertex {idx} out of range")))
        })
        .collect::<MeshResult<Vec<Point3<f64>>>>()?;

    let centroid = Point3::from(positions.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n as f64);
    let hole_normal = loop_normal(&positions, &centroid);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let next = remaining[(i + 1) % len];
            is_ear(&positions, &remaining, prev, remaining[i], next, &hole_normal)
        });

        let Some(i) = ear else {
            warn!(
                "Ear clipping stuck with {} vertices remaining, using fan triangulation",
                len
            );
            break;
        };

        let prev = remaining[(i + len - 1) % len];
        let next = remaining[(i + 1) % len];
        triangles.push([hole.vertices[prev], hole.vertices[remaining[i]], hole.vertices[next]]);
        remaining.remove(i);
    }

    // Whatever is left (a triangle, or a stuck polygon) becomes a fan.
    for i in 1..remaining.len().saturating_sub(1) {
        triangles.push([
            hole.vertices[remaining[0]],
            hole.vertices[remaining[i]],
            hole.vertices[remaining[i + 1]],
        ]);
    }

    debug!("Filled hole with {} edges using {} triangles", n, triangles.len());
    Ok(triangles)
}

/// Newell-style normal of a closed polygon, +Z for a degenerate loop.
fn loop_normal(positions: &[Point3<f64>], centroid: &Point3<f64>) -> Vector3<f64> {
    let n = positions.len();
    let normal: Vector3<f64> = (0..n)
        .map(|i| (positions[i] - centroid).cross(&(positions[(i + 1) % n] - centroid)))
        .sum();

    normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    hole_normal: &Vector3<f64>,
) -> bool {
    let (a, b, c) = (positions[prev], positions[curr], positions[next]);

    // Reflex or degenerate corners are never ears.
    match Triangle::new(a, b, c).normal() {
        Some(n) if n.dot(hole_normal) >= 0.0 => {}
        _ => return false,
    }

    !remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .any(|&idx| point_in_triangle_projected(&positions[idx], &a, &b, &c, hole_normal))
}

/// Point-in-triangle test after dropping the axis most aligned with `normal`.
fn point_in_triangle_projected(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let abs = normal.abs();
    let project = |q: &Point3<f64>| -> (f64, f64) {
        if abs.z >= abs.x && abs.z >= abs.y {
            (q.x, q.y)
        } else if abs.y >= abs.x {
            (q.x, q.z)
        } else {
            (q.y, q.z)
        }
    };

    let (p, a, b, c) = (project(p), project(a), project(b), project(c));
    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };

    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Fill every hole of up to [`DEFAULT_MAX_HOLE_EDGES`] edges.
pub fn fill_holes(mesh: &mut Mesh) -> MeshResult<usize> {
    fill_holes_with_max_edges(mesh, DEFAULT_MAX_HOLE_EDGES)
}

/// Fill all holes with at most `max_hole_edges` edges.
///
/// Larger holes are left open and logged. Returns the number of holes filled.
/// Holes are triangulated in parallel and merged in loop order.
pub fn fill_holes_with_max_edges(mesh: &mut Mesh, max_hole_edges: usize) -> MeshResult<usize> {
    let analysis = analyze_boundary(mesh);

    let (fillable, skipped): (Vec<_>, Vec<_>) = analysis
        .loops
        .into_iter()
        .partition(|hole| hole.edge_count() <= max_hole_edges);

    for hole in &skipped {
        debug!(
            "Skipping hole with {} edges (max: {})",
            hole.edge_count(),
            max_hole_edges
        );
    }

    let source: &Mesh = mesh;
    let caps = fillable
        .par_iter()
        .map(|hole| fill_hole_ear_clipping(source, hole))
        .collect::<MeshResult<Vec<_>>>()?;

    let filled = caps.len();
    for triangles in caps {
        mesh.faces.extend(triangles);
    }

    if filled > 0 || !skipped.is_empty() {
        info!("Filled {} holes, left {} open", filled, skipped.len());
    }

    Ok(filled)
}
