//! Height-based margin detection.
//!
//! 1. Candidates are vertices whose Z exceeds `mean + height_offset * std`
//!    (population standard deviation), in ascending vertex order.
//! 2. Each candidate is scored by the summed magnitude of its adjacent face
//!    normals, normalized by the highest score, and kept if the score exceeds
//!    `1 - sensitivity`. If scoring fails the candidates are kept unfiltered.
//! 3. More than `density` survivors are subsampled at evenly spaced indices,
//!    first and last included.
//! 4. Points are ordered by angle around their XY centroid.
//!
//! The score is a face-count proxy, not a true curvature measure, and the
//! angular ordering assumes the margin is star-shaped around its centroid.

use dent_mesh::{Mesh, MeshError, MeshResult, OperationTimer};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::MarginPoint;
use crate::error::{ModelError, ModelResult};

/// Detected confidence is `BASE_CONFIDENCE + CONFIDENCE_SPAN * score`.
const BASE_CONFIDENCE: f64 = 0.8;
const CONFIDENCE_SPAN: f64 = 0.2;

/// Parameters for margin detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginParams {
    /// Height threshold in standard deviations above the mean Z.
    pub height_offset: f64,
    /// Maximum number of points returned.
    pub density: usize,
    /// In `[0, 1]`; higher keeps more candidates.
    pub sensitivity: f64,
}

impl Default for MarginParams {
    fn default() -> Self {
        Self {
            height_offset: 0.2,
            density: 50,
            sensitivity: 0.7,
        }
    }
}

impl MarginParams {
    pub fn validate(&self) -> ModelResult<()> {
        if !self.height_offset.is_finite() {
            return Err(ModelError::invalid_parameter(
                "height_offset",
                self.height_offset,
                "must be finite",
            ));
        }
        if self.density < 1 {
            return Err(ModelError::invalid_parameter(
                "density",
                self.density,
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.sensitivity) {
            return Err(ModelError::invalid_parameter(
                "sensitivity",
                self.sensitivity,
                "must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// Detection result with the intermediate statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginDetection {
    /// Ordered margin polyline.
    pub points: Vec<MarginPoint>,
    pub mean_z: f64,
    pub std_z: f64,
    pub threshold: f64,
    /// Vertices above the height threshold.
    pub candidate_count: usize,
    /// Candidates that passed the score filter.
    pub filtered_count: usize,
    /// False when scoring failed and candidates were kept unfiltered.
    pub curvature_filtered: bool,
}

/// Detect the margin polyline of `mesh`.
pub fn detect_margin(mesh: &Mesh, params: &MarginParams) -> ModelResult<Vec<MarginPoint>> {
    detect_margin_detailed(mesh, params).map(|d| d.points)
}

/// Detect the margin and report the intermediate statistics.
pub fn detect_margin_detailed(mesh: &Mesh, params: &MarginParams) -> ModelResult<MarginDetection> {
    params.validate()?;
    if mesh.vertices.is_empty() {
        return Err(ModelError::NoMarginCandidates {
            threshold: 0.0,
            mean: 0.0,
            std_dev: 0.0,
            height_offset: params.height_offset,
        });
    }
    let _timer = OperationTimer::with_context("detect_margin", mesh.face_count(), mesh.vertex_count());
    info!(
        "Starting margin detection with offset={}, density={}, sensitivity={}",
        params.height_offset, params.density, params.sensitivity
    );

    let (mean_z, std_z) = height_stats(mesh);
    let threshold = mean_z + params.height_offset * std_z;

    let candidates: Vec<u32> = mesh
        .vertices
        .iter()
        .enumerate()
        .filter(|(_, v)| v.position.z > threshold)
        .map(|(i, _)| i as u32)
        .collect();

    if candidates.is_empty() {
        return Err(ModelError::NoMarginCandidates {
            threshold,
            mean: mean_z,
            std_dev: std_z,
            height_offset: params.height_offset,
        });
    }
    debug!(
        "{} candidates above z = {:.4} (mean {:.4}, std {:.4})",
        candidates.len(),
        threshold,
        mean_z,
        std_z
    );

    let (scored, curvature_filtered) = match curvature_scores(mesh, &candidates) {
        Ok(scores) => {
            let cutoff = 1.0 - params.sensitivity;
            let kept: Vec<(u32, f64)> = candidates
                .iter()
                .copied()
                .zip(scores)
                .filter(|&(_, score)| score > cutoff)
                .collect();
            (kept, true)
        }
        Err(e) => {
            warn!("Curvature filtering failed, keeping all candidates: {}", e);
            (candidates.iter().map(|&i| (i, 1.0)).collect(), false)
        }
    };
    let filtered_count = scored.len();

    let mut points: Vec<MarginPoint> = subsample_indices(scored.len(), params.density)
        .into_iter()
        .map(|k| {
            let (vertex, score) = scored[k];
            MarginPoint::new(
                mesh.vertices[vertex as usize].position,
                BASE_CONFIDENCE + CONFIDENCE_SPAN * score,
            )
        })
        .collect();

    sort_by_angle(&mut points);

    info!("Detected {} margin points", points.len());
    Ok(MarginDetection {
        points,
        mean_z,
        std_z,
        threshold,
        candidate_count: candidates.len(),
        filtered_count,
        curvature_filtered,
    })
}

/// Mean and population standard deviation of vertex Z.
fn height_stats(mesh: &Mesh) -> (f64, f64) {
    let n = mesh.vertices.len() as f64;
    let mean = mesh.vertices.iter().map(|v| v.position.z).sum::<f64>() / n;
    let variance = mesh
        .vertices
        .iter()
        .map(|v| (v.position.z - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

/// Normalized face-normal magnitude sum for each candidate, in candidate order.
///
/// A non-degenerate face contributes 1 to each of its corners, a degenerate
/// face 0. Scores are divided by the maximum when that is positive.
fn curvature_scores(mesh: &Mesh, candidates: &[u32]) -> MeshResult<Vec<f64>> {
    let vertex_count = mesh.vertices.len();
    let mut is_candidate = vec![false; vertex_count];
    for &c in candidates {
        is_candidate[c as usize] = true;
    }

    let mut accum = vec![0.0f64; vertex_count];
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(MeshError::invalid_vertex_index(face_idx, bad, vertex_count));
        }
        let magnitude = match mesh.triangle(face_idx).and_then(|t| t.normal()) {
            Some(_) => 1.0,
            None => 0.0,
        };
        for &v in face {
            if is_candidate[v as usize] {
                accum[v as usize] += magnitude;
            }
        }
    }

    let max = accum.iter().copied().fold(0.0f64, f64::max);
    let scale = if max > 0.0 { 1.0 / max } else { 1.0 };
    Ok(candidates.iter().map(|&c| accum[c as usize] * scale).collect())
}

/// Indices `floor(k * (len - 1) / (density - 1))` for `k` in `0..density`
/// when `len > density`, otherwise every index.
pub(crate) fn subsample_indices(len: usize, density: usize) -> Vec<usize> {
    if len <= density {
        return (0..len).collect();
    }
    if density == 1 {
        return vec![0];
    }
    (0..density).map(|k| k * (len - 1) / (density - 1)).collect()
}

/// Stable sort by `atan2` around the XY centroid. Fewer than 3 points are
/// left as they are.
pub(crate) fn sort_by_angle(points: &mut [MarginPoint]) {
    if points.len() < 3 {
        return;
    }
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;

    points.sort_by(|a, b| {
        let aa = (a.y - cy).atan2(a.x - cx);
        let ab = (b.y - cy).atan2(b.x - cx);
        aa.total_cmp(&ab)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelErrorCode;
    use approx::assert_relative_eq;
    use dent_mesh::Vertex;
    use std::f64::consts::PI;

    /// Fan around a low center with a raised rim: `rim` vertices on a circle
    /// of radius 5 at z = 2, center at z = 0. Rim angles avoid the atan2
    /// branch cut at +-pi.
    fn crown(rim: usize) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        for k in 0..rim {
            let a = 2.0 * PI * (k as f64 + 0.5) / rim as f64;
            mesh.vertices.push(Vertex::from_coords(5.0 * a.cos(), 5.0 * a.sin(), 2.0));
        }
        for k in 0..rim as u32 {
            mesh.faces.push([0, 1 + k, 1 + (k + 1) % rim as u32]);
        }
        mesh
    }

    #[test]
    fn test_rim_is_detected_in_angle_order() {
        let mesh = crown(12);
        let points = detect_margin(&mesh, &MarginParams::default()).unwrap();

        assert_eq!(points.len(), 12);
        for p in &points {
            assert_relative_eq!(p.z, 2.0);
            assert_relative_eq!(p.confidence, 1.0);
        }
        let angles: Vec<f64> = points.iter().map(|p| p.y.atan2(p.x)).collect();
        assert!(angles.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_density_caps_point_count() {
        let mesh = crown(40);
        let params = MarginParams {
            height_offset: 0.0,
            density: 10,
            ..Default::default()
        };
        let detection = detect_margin_detailed(&mesh, &params).unwrap();
        assert_eq!(detection.candidate_count, 40);
        assert_eq!(detection.points.len(), 10);
    }

    #[test]
    fn test_flat_mesh_has_no_candidates() {
        let mut mesh = crown(8);
        for v in &mut mesh.vertices {
            v.position.z = 1.0;
        }
        let err = detect_margin(&mesh, &MarginParams::default()).unwrap_err();
        assert_eq!(err.code(), ModelErrorCode::NoMarginCandidates);
    }

    #[test]
    fn test_mesh_without_vertices_has_no_candidates() {
        let err = detect_margin_detailed(&Mesh::new(), &MarginParams::default()).unwrap_err();
        assert_eq!(err.code(), ModelErrorCode::NoMarginCandidates);
        assert!(matches!(err, ModelError::NoMarginCandidates { std_dev, .. } if std_dev == 0.0));
    }

    #[test]
    fn test_sensitivity_filters_low_scores() {
        // Extra raised vertex 9 touched by a single face shared with rim
        // vertices 1 and 2.
        let mut mesh = crown(8);
        mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 2.0));
        mesh.faces.push([1, 9, 2]);

        let strict = MarginParams {
            sensitivity: 0.4,
            ..Default::default()
        };
        let detection = detect_margin_detailed(&mesh, &strict).unwrap();
        assert_eq!(detection.candidate_count, 9);
        // Vertices 1 and 2 have 3 faces, the rest 2, vertex 9 only 1.
        // Scores: 1.0, 1.0, then 2/3 for six rim vertices, 1/3 for vertex 9.
        assert_eq!(detection.filtered_count, 8);
        assert!(detection.points.iter().all(|p| p.x < 9.0));
    }

    #[test]
    fn test_invalid_face_fails_open() {
        let mut mesh = crown(6);
        mesh.faces.push([0, 1, 99]);
        let detection = detect_margin_detailed(&mesh, &MarginParams::default()).unwrap();
        assert!(!detection.curvature_filtered);
        assert_eq!(detection.points.len(), 6);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mesh = crown(6);
        for params in [
            MarginParams { density: 0, ..Default::default() },
            MarginParams { sensitivity: 1.5, ..Default::default() },
            MarginParams { sensitivity: f64::NAN, ..Default::default() },
            MarginParams { height_offset: f64::INFINITY, ..Default::default() },
        ] {
            let err = detect_margin(&mesh, &params).unwrap_err();
            assert_eq!(err.code(), ModelErrorCode::InvalidParameter);
        }
    }

    #[test]
    fn test_subsample_indices() {
        assert_eq!(subsample_indices(5, 10), vec![0, 1, 2, 3, 4]);
        assert_eq!(subsample_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(subsample_indices(7, 1), vec![0]);
        assert_eq!(subsample_indices(11, 2), vec![0, 10]);
    }

    #[test]
    fn test_sort_leaves_short_lists() {
        let mut points = vec![
            MarginPoint::new(Point3::new(1.0, 0.0, 0.0), 1.0),
            MarginPoint::new(Point3::new(-1.0, 0.0, 0.0), 1.0),
        ];
        let before = points.clone();
        sort_by_angle(&mut points);
        assert_eq!(points, before);
    }
}
