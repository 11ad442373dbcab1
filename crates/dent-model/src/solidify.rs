//! Solidification: turn an open scan surface into a closed solid of uniform
//! wall thickness.
//!
//! The primary path offsets every vertex inward along its normal, reverses
//! the inner copy and stitches the two surfaces together along every
//! boundary loop. If that fails the fallback keeps the offset surfaces
//! without stitching. Which path produced the result is reported in
//! [`SolidifyStats`].
//!
//! # Example
//!
//! ```no_run
//! use dent_mesh::Mesh;
//! use dent_model::SolidifyBuilder;
//!
//! let scan = Mesh::load("crown.stl").unwrap();
//! let solid = SolidifyBuilder::new(&scan).thickness(1.5).build().unwrap();
//! println!("{}", solid.stats);
//! solid.mesh.save("crown_solid.stl").unwrap();
//! ```

use std::fmt;

use dent_mesh::{
    BoundaryLoop, Mesh, OperationTimer, Vertex, analyze_boundary, fill_holes_with_max_edges,
    fix_normals, log_mesh_stats, remove_degenerate_triangles, remove_duplicate_faces, vertex_normals,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ModelError, ModelResult};

/// Parameters for solidification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidifyParams {
    /// Wall thickness in mm; the inner surface sits this far inside the outer.
    pub thickness: f64,
    /// Holes with at most this many edges are filled before offsetting.
    /// The default of 4 closes single missing triangles and quads only.
    pub max_hole_edges: usize,
    /// Faces with area below this are removed during cleanup.
    pub degenerate_area_threshold: f64,
}

impl Default for SolidifyParams {
    fn default() -> Self {
        Self {
            thickness: 2.0,
            max_hole_edges: 4,
            degenerate_area_threshold: dent_mesh::DEFAULT_DEGENERATE_AREA,
        }
    }
}

impl SolidifyParams {
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !self.thickness.is_finite() || self.thickness <= 0.0 {
            return Err(ModelError::invalid_parameter(
                "thickness",
                self.thickness,
                "must be a finite positive distance in mm",
            ));
        }
        if !self.degenerate_area_threshold.is_finite() || self.degenerate_area_threshold < 0.0 {
            return Err(ModelError::invalid_parameter(
                "degenerate_area_threshold",
                self.degenerate_area_threshold,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// What the solidifier did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolidifyStats {
    /// The stitched primary path succeeded.
    pub solidified_fully: bool,
    /// The result is watertight.
    pub watertight: bool,
    /// Why the primary path was abandoned, if it was.
    pub fallback_reason: Option<String>,
    pub thickness: f64,
    pub input_faces: usize,
    /// Holes closed before offsetting.
    pub holes_filled: usize,
    pub outer_faces: usize,
    pub inner_faces: usize,
    pub stitch_faces: usize,
    /// Boundary loops stitched.
    pub boundary_loops: usize,
    /// Total edges over all stitched loops.
    pub boundary_edges: usize,
    pub duplicates_removed: usize,
    pub degenerates_removed: usize,
    pub vertex_count: usize,
    pub face_count: usize,
}

impl fmt::Display for SolidifyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solidify ({:.2} mm):", self.thickness)?;
        writeln!(
            f,
            "  Path: {}",
            if self.solidified_fully { "stitched" } else { "fallback" }
        )?;
        if let Some(reason) = &self.fallback_reason {
            writeln!(f, "  Fallback reason: {}", reason)?;
        }
        writeln!(
            f,
            "  Faces: {} outer + {} inner + {} stitch",
            self.outer_faces, self.inner_faces, self.stitch_faces
        )?;
        writeln!(
            f,
            "  Boundary: {} loop(s), {} edges",
            self.boundary_loops, self.boundary_edges
        )?;
        write!(
            f,
            "  Result: {} vertices, {} faces, watertight: {}",
            self.vertex_count, self.face_count, self.watertight
        )
    }
}

/// A solidified mesh and its statistics.
#[derive(Debug, Clone)]
pub struct Solidified {
    pub mesh: Mesh,
    pub stats: SolidifyStats,
}

/// Solidify `mesh` with the given parameters. The input is not modified.
///
/// Errors only on invalid parameters, or when even the fallback cannot build
/// a mesh (no faces, invalid indices, or no computable normals).
pub fn solidify(mesh: &Mesh, params: &SolidifyParams) -> ModelResult<Solidified> {
    params.validate()?;
    let _timer = OperationTimer::with_context("solidify", mesh.face_count(), mesh.vertex_count());
    info!("Starting solidification with {:.2}mm thickness", params.thickness);

    let mut working = mesh.clone();
    let mut stats = SolidifyStats {
        thickness: params.thickness,
        input_faces: mesh.face_count(),
        ..Default::default()
    };

    if !working.is_empty() && !working.is_watertight() {
        stats.holes_filled = close_small_holes(&mut working, params.max_hole_edges);
    }

    let result = match solidify_stitched(&working, params, &mut stats) {
        Ok(solid) => {
            stats.solidified_fully = true;
            solid
        }
        Err(e) => {
            warn!("Stitched solidification failed: {}", e);
            stats.fallback_reason = Some(e.to_string());
            solidify_offset_only(&working, params, &mut stats)?
        }
    };

    log_mesh_stats(&result, "solidified");
    stats.watertight = result.is_watertight();
    stats.vertex_count = result.vertex_count();
    stats.face_count = result.face_count();

    info!(
        "Solidification complete: {} vertices, {} faces (stitched: {}, watertight: {})",
        stats.vertex_count, stats.face_count, stats.solidified_fully, stats.watertight
    );

    Ok(Solidified { mesh: result, stats })
}

/// Best-effort hole filling before offsetting. Failures are logged only.
fn close_small_holes(mesh: &mut Mesh, max_hole_edges: usize) -> usize {
    info!("Mesh is not watertight, filling holes up to {} edges", max_hole_edges);
    let filled = match fill_holes_with_max_edges(mesh, max_hole_edges) {
        Ok(n) => n,
        Err(e) => {
            warn!("Hole filling failed, continuing with open mesh: {}", e);
            0
        }
    };
    if let Err(e) = fix_normals(mesh) {
        warn!("Normal fixing failed, continuing: {}", e);
    }
    filled
}

/// Vertex normals that are usable for offsetting: at least one must be non-zero.
fn offset_normals(mesh: &Mesh) -> ModelResult<Vec<Vector3<f64>>> {
    let normals = vertex_normals(mesh)?;
    if normals.iter().all(|n| *n == Vector3::zeros()) {
        return Err(ModelError::solidification_failed(
            "no vertex has a computable normal",
        ));
    }
    Ok(normals)
}

/// Outer vertices followed by their inward offsets; outer faces followed by
/// reversed inner faces.
fn offset_shell(mesh: &Mesh, normals: &[Vector3<f64>], thickness: f64) -> Mesh {
    let n = mesh.vertex_count() as u32;
    let mut shell = Mesh::with_capacity(mesh.vertex_count() * 2, mesh.face_count() * 2);

    shell.vertices.extend(mesh.positions().map(Vertex::new));
    shell.vertices.extend(
        mesh.positions()
            .zip(normals)
            .map(|(p, normal)| Vertex::new(p - normal * thickness)),
    );

    shell.faces.extend_from_slice(&mesh.faces);
    shell
        .faces
        .extend(mesh.faces.iter().map(|&[a, b, c]| [a + n, c + n, b + n]));
    shell
}

/// Two triangles per loop edge, closing edge included:
/// `(o_i, o_{i+1}, in_i)` and `(o_{i+1}, in_{i+1}, in_i)` with `in = o + n`.
pub(crate) fn stitch_loop(boundary: &BoundaryLoop, vertex_offset: u32) -> Vec<[u32; 3]> {
    boundary
        .edges()
        .flat_map(|(a, b)| {
            let (ia, ib) = (a + vertex_offset, b + vertex_offset);
            [[a, b, ia], [b, ib, ia]]
        })
        .collect()
}

fn solidify_stitched(
    mesh: &Mesh,
    params: &SolidifyParams,
    stats: &mut SolidifyStats,
) -> ModelResult<Mesh> {
    let normals = offset_normals(mesh)?;

    let boundary = analyze_boundary(mesh);
    if !boundary.is_valid() {
        return Err(ModelError::solidification_failed(format!(
            "boundary cannot be stitched: {} non-manifold vertices, {} orphan edges",
            boundary.non_manifold_vertices.len(),
            boundary.orphan_edges.len()
        )));
    }

    let mut solid = offset_shell(mesh, &normals, params.thickness);
    let n = mesh.vertex_count() as u32;

    let mut stitch_faces = Vec::new();
    for boundary_loop in &boundary.loops {
        stitch_faces.extend(stitch_loop(boundary_loop, n));
    }
    debug!(
        "Stitching {} boundary loop(s) with {} faces",
        boundary.loops.len(),
        stitch_faces.len()
    );

    stats.outer_faces = mesh.face_count();
    stats.inner_faces = mesh.face_count();
    stats.stitch_faces = stitch_faces.len();
    stats.boundary_loops = boundary.loops.len();
    stats.boundary_edges = boundary.loops.iter().map(|l| l.edge_count()).sum();
    solid.faces.extend(stitch_faces);

    stats.duplicates_removed = remove_duplicate_faces(&mut solid);
    stats.degenerates_removed = remove_degenerate_triangles(&mut solid, params.degenerate_area_threshold);
    if solid.faces.is_empty() {
        return Err(ModelError::solidification_failed(
            "cleanup removed every face",
        ));
    }
    fix_normals(&mut solid)?;

    Ok(solid)
}

fn solidify_offset_only(
    mesh: &Mesh,
    params: &SolidifyParams,
    stats: &mut SolidifyStats,
) -> ModelResult<Mesh> {
    info!("Using offset-only solidification fallback");

    let normals = offset_normals(mesh).map_err(|e| match e {
        ModelError::Mesh(inner) => ModelError::solidification_failed(inner.to_string()),
        other => other,
    })?;

    let mut solid = offset_shell(mesh, &normals, params.thickness);
    stats.outer_faces = mesh.face_count();
    stats.inner_faces = mesh.face_count();
    stats.stitch_faces = 0;
    stats.boundary_loops = 0;
    stats.boundary_edges = 0;
    stats.duplicates_removed = 0;
    stats.degenerates_removed = 0;

    fix_normals(&mut solid).map_err(|e| ModelError::solidification_failed(e.to_string()))?;
    Ok(solid)
}

/// Fluent builder for solidification.
///
/// ```no_run
/// use dent_mesh::Mesh;
/// use dent_model::SolidifyBuilder;
///
/// let scan = Mesh::load("scan.stl").unwrap();
/// let solid = SolidifyBuilder::new(&scan)
///     .thickness(2.5)
///     .max_hole_edges(8)
///     .build()
///     .unwrap();
/// ```
pub struct SolidifyBuilder<'a> {
    mesh: &'a Mesh,
    params: SolidifyParams,
}

impl<'a> SolidifyBuilder<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            params: SolidifyParams::default(),
        }
    }

    /// Start from existing parameters, e.g. loaded from configuration.
    pub fn with_params(mut self, params: SolidifyParams) -> Self {
        self.params = params;
        self
    }

    /// Wall thickness in mm.
    pub fn thickness(mut self, mm: f64) -> Self {
        self.params.thickness = mm;
        self
    }

    /// Largest hole (in edges) filled before offsetting.
    pub fn max_hole_edges(mut self, edges: usize) -> Self {
        self.params.max_hole_edges = edges;
        self
    }

    pub fn degenerate_area_threshold(mut self, area: f64) -> Self {
        self.params.degenerate_area_threshold = area;
        self
    }

    pub fn params(&self) -> &SolidifyParams {
        &self.params
    }

    pub fn build(self) -> ModelResult<Solidified> {
        solidify(self.mesh, &self.params)
    }
}
