//! Triangle mesh geometry for dental scan preparation.
//!
//! This crate is the geometry layer underneath the modeling operations:
//! an indexed triangle mesh type plus the queries and repairs those
//! operations need.
//!
//! - **I/O**: binary/ASCII STL in, binary STL out (files or byte buffers)
//! - **Topology**: edge adjacency, watertight test, boundary loops
//! - **Repair**: hole filling, winding/normal fixing, duplicate and degenerate face removal
//! - **Measurement**: volume, surface area, bounding box, face and vertex normals
//!
//! # Units and Conventions
//!
//! Coordinates are millimeters as exported by intraoral scanners. The
//! coordinate system is right-handed with Z as the occlusal axis. Face
//! winding is counter-clockwise seen from outside, so normals point outward
//! by the right-hand rule.
//!
//! # Quick Start
//!
//! ```no_run
//! use dent_mesh::Mesh;
//!
//! let mut mesh = Mesh::load("scan.stl").unwrap();
//! if !mesh.is_watertight() {
//!     mesh.fill_holes().unwrap();
//! }
//! mesh.fix_normals().unwrap();
//! mesh.save("scan_fixed.stl").unwrap();
//! ```

mod error;
pub mod tracing_ext;
mod types;

pub mod adjacency;
pub mod boundary;
pub mod cleanup;
pub mod holes;
pub mod io;
pub mod normals;
pub mod validate;
pub mod winding;

pub use error::{ErrorCode, MeshError, MeshLocation, MeshResult, RecoverySuggestion};
pub use types::{Mesh, Triangle, Vertex};

pub use adjacency::MeshAdjacency;
pub use boundary::{BoundaryAnalysis, BoundaryLoop, analyze_boundary, boundary_loop, boundary_loops};
pub use cleanup::{DEFAULT_DEGENERATE_AREA, remove_degenerate_triangles, remove_duplicate_faces};
pub use holes::{fill_holes, fill_holes_with_max_edges};
pub use io::{load_mesh, load_stl_bytes, save_mesh, save_stl_bytes};
pub use normals::{compute_vertex_normals, face_normals, vertex_normals};
pub use tracing_ext::{OperationTimer, log_mesh_stats};
pub use validate::validate_mesh_data;
pub use winding::{fix_normals, fix_winding_order};

impl Mesh {
    /// Load a mesh from an STL file.
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        io::load_mesh(path.as_ref())
    }

    /// Save the mesh as binary STL.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MeshResult<()> {
        io::save_mesh(self, path.as_ref())
    }

    /// Every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        MeshAdjacency::build(&self.faces).is_watertight()
    }

    /// Fill holes of up to [`holes::DEFAULT_MAX_HOLE_EDGES`] edges.
    pub fn fill_holes(&mut self) -> MeshResult<usize> {
        holes::fill_holes(self)
    }

    /// Consistent outward winding plus recomputed vertex normals.
    pub fn fix_normals(&mut self) -> MeshResult<()> {
        winding::fix_normals(self)
    }

    /// Area-weighted unit vertex normals, one per vertex.
    pub fn vertex_normals(&self) -> MeshResult<Vec<nalgebra::Vector3<f64>>> {
        normals::vertex_normals(self)
    }

    /// The longest boundary loop, `None` when the mesh is closed.
    pub fn boundary_loop(&self) -> Option<BoundaryLoop> {
        boundary::boundary_loop(self)
    }
}
