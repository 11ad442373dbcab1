//! Summary statistics for a loaded model.

use std::fmt;

use dent_mesh::{Mesh, validate_mesh_data};
use serde::Serialize;

use crate::error::ModelResult;

/// Counts and measurements of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub vertices: usize,
    pub faces: usize,
    pub watertight: bool,
    /// Enclosed volume in mm³; only reported for watertight meshes.
    pub volume: Option<f64>,
    /// Surface area in mm².
    pub surface_area: f64,
    pub bounds: Option<ModelBounds>,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl ModelBounds {
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

impl ModelInfo {
    /// Measure `mesh`. Fails on out-of-range face indices or non-finite
    /// coordinates.
    pub fn from_mesh(mesh: &Mesh) -> ModelResult<Self> {
        validate_mesh_data(mesh)?;

        let watertight = !mesh.faces.is_empty() && mesh.is_watertight();
        let bounds = mesh.bounds().map(|(min, max)| ModelBounds {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
        });

        Ok(Self {
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),
            watertight,
            volume: watertight.then(|| mesh.volume()),
            surface_area: mesh.surface_area(),
            bounds,
        })
    }
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vertices:     {}", self.vertices)?;
        writeln!(f, "Faces:        {}", self.faces)?;
        writeln!(f, "Watertight:   {}", self.watertight)?;
        match self.volume {
            Some(v) => writeln!(f, "Volume:       {:.3} mm³", v)?,
            None => writeln!(f, "Volume:       n/a (open mesh)")?,
        }
        write!(f, "Surface area: {:.3} mm²", self.surface_area)?;
        if let Some(b) = &self.bounds {
            let [sx, sy, sz] = b.size();
            write!(
                f,
                "\nBounds:       [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}] ({:.3} x {:.3} x {:.3} mm)",
                b.min[0], b.min[1], b.min[2], b.max[0], b.max[1], b.max[2], sx, sy, sz
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dent_mesh::Vertex;

    fn unit_tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
        mesh.faces.extend([[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]]);
        mesh
    }

    #[test]
    fn test_closed_mesh_reports_volume() {
        let info = ModelInfo::from_mesh(&unit_tetrahedron()).unwrap();
        assert_eq!(info.vertices, 4);
        assert_eq!(info.faces, 4);
        assert!(info.watertight);
        assert_relative_eq!(info.volume.unwrap(), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(info.surface_area, 1.5 + 3f64.sqrt() / 2.0, epsilon = 1e-12);
        let bounds = info.bounds.unwrap();
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_open_mesh_has_no_volume() {
        let mut mesh = unit_tetrahedron();
        mesh.faces.pop();
        let info = ModelInfo::from_mesh(&mesh).unwrap();
        assert!(!info.watertight);
        assert_eq!(info.volume, None);

        let json = serde_json::to_value(&info).unwrap();
        assert!(json["volume"].is_null());
        assert_eq!(json["faces"], 3);
    }

    #[test]
    fn test_bounds_size_in_summary() {
        let mut mesh = unit_tetrahedron();
        for v in &mut mesh.vertices {
            v.position.x *= 4.0;
            v.position.z += 2.0;
        }
        let info = ModelInfo::from_mesh(&mesh).unwrap();
        assert_eq!(info.bounds.unwrap().size(), [4.0, 1.0, 1.0]);
        assert!(info.to_string().ends_with("(4.000 x 1.000 x 1.000 mm)"));
    }

    #[test]
    fn test_invalid_index_rejected() {
        let mut mesh = unit_tetrahedron();
        mesh.faces.push([0, 1, 42]);
        assert!(ModelInfo::from_mesh(&mesh).is_err());
    }
}
