//! Orientation of a model by named view preset or explicit Euler rotation.
//!
//! Rotations are X-Y-Z Euler angles in degrees, composed as fixed-axis
//! rotations: first about X, then Y, then Z (`R = Rz · Ry · Rx`). Vertices are
//! rotated about the origin; there is no translation or scaling.

use std::fmt;
use std::str::FromStr;

use dent_mesh::{Mesh, OperationTimer, log_mesh_stats, validate_mesh_data};
use nalgebra::{Point3, Rotation3};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};

/// The built-in camera/view presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewPreset {
    Default,
    OcclusalUp,
    OcclusalDown,
    BuccalFront,
    BuccalBack,
    LingualView,
    MesialView,
    DistalView,
}

impl ViewPreset {
    /// All presets in table order.
    pub const ALL: [ViewPreset; 8] = [
        ViewPreset::Default,
        ViewPreset::OcclusalUp,
        ViewPreset::OcclusalDown,
        ViewPreset::BuccalFront,
        ViewPreset::BuccalBack,
        ViewPreset::LingualView,
        ViewPreset::MesialView,
        ViewPreset::DistalView,
    ];

    /// Wire name, e.g. `occlusalDown`.
    pub fn name(&self) -> &'static str {
        match self {
            ViewPreset::Default => "default",
            ViewPreset::OcclusalUp => "occlusalUp",
            ViewPreset::OcclusalDown => "occlusalDown",
            ViewPreset::BuccalFront => "buccalFront",
            ViewPreset::BuccalBack => "buccalBack",
            ViewPreset::LingualView => "lingualView",
            ViewPreset::MesialView => "mesialView",
            ViewPreset::DistalView => "distalView",
        }
    }

    /// Rotation in degrees about X, Y, Z.
    pub fn degrees(&self) -> [f64; 3] {
        match self {
            ViewPreset::Default | ViewPreset::OcclusalUp | ViewPreset::BuccalFront => [0.0, 0.0, 0.0],
            ViewPreset::OcclusalDown => [180.0, 0.0, 0.0],
            ViewPreset::BuccalBack | ViewPreset::LingualView => [0.0, 180.0, 0.0],
            ViewPreset::MesialView => [0.0, 90.0, 0.0],
            ViewPreset::DistalView => [0.0, -90.0, 0.0],
        }
    }
}

impl fmt::Display for ViewPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewPreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewPreset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                ModelError::invalid_orientation(
                    format!("unknown preset '{s}'"),
                    ViewPreset::ALL.iter().map(|p| p.name().to_string()).collect(),
                )
            })
    }
}

/// Ordered, immutable table of preset name to rotation degrees.
///
/// Serializes as a JSON object in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationPresets {
    entries: Vec<(String, [f64; 3])>,
}

impl Default for OrientationPresets {
    fn default() -> Self {
        Self {
            entries: ViewPreset::ALL
                .iter()
                .map(|p| (p.name().to_string(), p.degrees()))
                .collect(),
        }
    }
}

impl OrientationPresets {
    /// Build a table from explicit entries. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, [f64; 3])>) -> Self {
        let mut table = Self { entries: Vec::new() };
        for (name, degrees) in entries {
            match table.entries.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = degrees,
                None => table.entries.push((name, degrees)),
            }
        }
        table
    }

    pub fn get(&self, name: &str) -> Option<[f64; 3]> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| *d)
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, [f64; 3])> {
        self.entries.iter().map(|(n, d)| (n.as_str(), *d))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for OrientationPresets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, degrees) in &self.entries {
            map.serialize_entry(name, degrees)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrientationPresets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PresetsVisitor;

        impl<'de> Visitor<'de> for PresetsVisitor {
            type Value = OrientationPresets;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of preset name to [x, y, z] degrees")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((name, degrees)) = access.next_entry::<String, [f64; 3]>()? {
                    entries.push((name, degrees));
                }
                Ok(OrientationPresets::from_entries(entries))
            }
        }

        deserializer.deserialize_map(PresetsVisitor)
    }
}

/// A request to orient a model: a preset name, an explicit rotation, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationRequest {
    /// Preset name looked up in the preset table.
    #[serde(default)]
    pub preset: Option<String>,
    /// Explicit rotation in degrees about X, Y, Z.
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
}

impl OrientationRequest {
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            rotation: None,
        }
    }

    pub fn rotation(degrees: [f64; 3]) -> Self {
        Self {
            preset: None,
            rotation: Some(degrees),
        }
    }

    /// Resolve to rotation degrees.
    ///
    /// A preset name found in `presets` wins. Otherwise the explicit rotation
    /// is used. Anything else is [`ModelError::InvalidOrientation`].
    pub fn resolve(&self, presets: &OrientationPresets) -> ModelResult<[f64; 3]> {
        if let Some(degrees) = self.preset.as_deref().and_then(|name| presets.get(name)) {
            debug!("Resolved preset {:?} to {:?}", self.preset, degrees);
            return Ok(degrees);
        }

        match (self.rotation, &self.preset) {
            (Some(rotation), _) => Ok(rotation),
            (None, Some(name)) => Err(ModelError::invalid_orientation(
                format!("unknown preset '{name}' and no rotation given"),
                presets.names(),
            )),
            (None, None) => Err(ModelError::invalid_orientation(
                "no orientation specified",
                presets.names(),
            )),
        }
    }
}

/// Rotation matrix for X-Y-Z Euler angles in degrees.
pub fn rotation_from_degrees(degrees: [f64; 3]) -> ModelResult<Rotation3<f64>> {
    if let Some(axis) = degrees.iter().position(|d| !d.is_finite()) {
        return Err(ModelError::invalid_orientation(
            format!("rotation component {} is {}", ["x", "y", "z"][axis], degrees[axis]),
            Vec::new(),
        ));
    }
    let [rx, ry, rz] = degrees.map(f64::to_radians);
    Ok(Rotation3::from_euler_angles(rx, ry, rz))
}

/// Rotate every vertex by the X-Y-Z Euler rotation `degrees`, then fix normals.
///
/// Vertex count and face connectivity are unchanged. On error the mesh is
/// left untouched.
pub fn apply_orientation(mesh: &mut Mesh, degrees: [f64; 3]) -> ModelResult<()> {
    let rotation = rotation_from_degrees(degrees)?;
    validate_mesh_data(mesh)?;
    let _timer = OperationTimer::with_context("orient", mesh.face_count(), mesh.vertex_count());

    let rotated: Vec<Point3<f64>> = mesh.positions().map(|p| rotation * p).collect();
    if let Some(index) = rotated.iter().position(|p| p.iter().any(|c| !c.is_finite())) {
        return Err(ModelError::invalid_orientation(
            format!("rotated vertex {index} has a non-finite coordinate"),
            Vec::new(),
        ));
    }

    let mut oriented = mesh.clone();
    for (vertex, position) in oriented.vertices.iter_mut().zip(rotated) {
        vertex.position = position;
    }
    oriented.fix_normals()?;
    *mesh = oriented;
    log_mesh_stats(mesh, "oriented");

    info!(
        "Applied rotation [{}, {}, {}] deg to {} vertices",
        degrees[0],
        degrees[1],
        degrees[2],
        mesh.vertex_count()
    );
    Ok(())
}

/// Resolve `request` against `presets` and apply it.
pub fn orient(mesh: &mut Mesh, request: &OrientationRequest, presets: &OrientationPresets) -> ModelResult<[f64; 3]> {
    let degrees = request.resolve(presets)?;
    if let Some(name) = request.preset.as_deref().filter(|n| presets.get(n).is_some()) {
        info!("Applying preset orientation: {}", name);
    }
    apply_orientation(mesh, degrees)?;
    Ok(degrees)
}
