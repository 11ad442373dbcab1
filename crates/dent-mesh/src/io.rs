//! STL import and export.
//!
//! STL is the only exchange format. Reading goes through `stl_io`, which
//! merges identical corner positions into shared vertices; writing emits a
//! binary STL with per-face normals.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::normals::face_normals;
use crate::validate::validate_mesh_data;
use crate::{Mesh, Vertex};

fn check_extension(path: &Path) -> MeshResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("stl") => Ok(()),
        _ => Err(MeshError::UnsupportedFormat {
            extension: path.extension().and_then(|e| e.to_str()).map(String::from),
        }),
    }
}

/// Read an STL (binary or ASCII) from any seekable reader.
///
/// `source_name` only appears in error messages. Faces that collapse onto a
/// repeated vertex are dropped. The result is validated and must be non-empty.
pub fn read_stl<R: Read + Seek>(reader: &mut R, source_name: &str) -> MeshResult<Mesh> {
    let stl = stl_io::read_stl(reader).map_err(|e| MeshError::parse_error(source_name, e.to_string()))?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    mesh.vertices.extend(
        stl.vertices
            .iter()
            .map(|v| Vertex::from_coords(v[0] as f64, v[1] as f64, v[2] as f64)),
    );

    let mut skipped = 0usize;
    for face in &stl.faces {
        let [a, b, c] = face.vertices.map(|i| i as u32);
        if a != b && b != c && a != c {
            mesh.faces.push([a, b, c]);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!("Dropped {} collapsed triangles from {}", skipped, source_name);
    }

    if mesh.is_empty() {
        return Err(MeshError::empty_mesh(format!("{source_name} contains no triangles")));
    }
    validate_mesh_data(&mesh)?;

    Ok(mesh)
}

/// Write the mesh as binary STL. Callers validate the mesh first.
pub(crate) fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let to_stl = |p: &nalgebra::Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .zip(face_normals(mesh))
        .map(|(tri, n)| stl_io::Triangle {
            normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
            vertices: [to_stl(&tri.v0), to_stl(&tri.v1), to_stl(&tri.v2)],
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}

/// Parse an in-memory STL document.
pub fn load_stl_bytes(bytes: &[u8]) -> MeshResult<Mesh> {
    read_stl(&mut Cursor::new(bytes), "<memory>")
}

/// Serialize the mesh to an in-memory binary STL document.
pub fn save_stl_bytes(mesh: &Mesh) -> MeshResult<Vec<u8>> {
    validate_mesh_data(mesh)?;
    let mut out = Vec::with_capacity(84 + mesh.face_count() * 50);
    write_stl(mesh, &mut out).map_err(|e| MeshError::io_write("<memory>", e))?;
    Ok(out)
}

/// Load a mesh from an `.stl` file.
pub fn load_mesh(path: &Path) -> MeshResult<Mesh> {
    check_extension(path)?;
    info!("Loading mesh from {:?}", path);

    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    let mesh = read_stl(&mut BufReader::new(file), &path.display().to_string())?;

    info!(
        "Loaded mesh: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    if let Some((min, max)) = mesh.bounds() {
        let dims = max - min;
        debug!(
            "Dimensions: {:.1} x {:.1} x {:.1}",
            dims.x, dims.y, dims.z
        );
    }

    Ok(mesh)
}

/// Save a mesh to an `.stl` file (binary).
pub fn save_mesh(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    check_extension(path)?;
    validate_mesh_data(mesh)?;
    info!("Saving mesh to {:?}", path);

    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer).map_err(|e| MeshError::io_write(path, e))?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;

    info!("Saved {} triangles to {:?}", mesh.face_count(), path);
    Ok(())
}
