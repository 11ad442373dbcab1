//! Gaussian smoothing of a closed margin polyline.
//!
//! Every output point is a weighted average of all input points, with
//! weights `exp(-d^2 / (2 s^2))` where `d` is the circular index distance.
//! Work is O(N^2), which is fine for margin-sized inputs.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::MarginPoint;
use crate::error::{ModelError, ModelResult};

/// Confidence carried by refined points.
pub const REFINED_CONFIDENCE: f64 = 0.9;

/// Parameters for margin refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Gaussian width in point indices.
    pub smoothness: f64,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self { smoothness: 5.0 }
    }
}

impl RefineParams {
    pub fn validate(&self) -> ModelResult<()> {
        if !self.smoothness.is_finite() || self.smoothness <= 0.0 {
            return Err(ModelError::invalid_parameter(
                "smoothness",
                self.smoothness,
                "must be finite and greater than 0",
            ));
        }
        Ok(())
    }
}

/// Smooth an ordered closed polyline.
///
/// Fewer than 3 points are returned unchanged.
pub fn refine_points(points: &[Point3<f64>], smoothness: f64) -> ModelResult<Vec<Point3<f64>>> {
    RefineParams { smoothness }.validate()?;

    let n = points.len();
    if n < 3 {
        debug!("Refinement skipped for {} points", n);
        return Ok(points.to_vec());
    }

    let two_s2 = 2.0 * smoothness * smoothness;
    // Weights only depend on the circular distance, so compute them once.
    let kernel: Vec<f64> = (0..=n / 2)
        .map(|d| {
            let d = d as f64;
            (-(d * d) / two_s2).exp()
        })
        .collect();

    let refined = (0..n)
        .map(|i| {
            let mut sum = Vector3::zeros();
            let mut total = 0.0;
            for (j, p) in points.iter().enumerate() {
                let diff = i.abs_diff(j);
                let w = kernel[diff.min(n - diff)];
                sum += p.coords * w;
                total += w;
            }
            // total >= 1 because the self weight is exp(0).
            Point3::from(sum / total)
        })
        .collect();

    Ok(refined)
}

/// Smooth a margin polyline, resetting every confidence to
/// [`REFINED_CONFIDENCE`].
pub fn refine_margin(points: &[MarginPoint], params: &RefineParams) -> ModelResult<Vec<MarginPoint>> {
    params.validate()?;
    info!(
        "Refining {} margin points with smoothness={}",
        points.len(),
        params.smoothness
    );

    let refined = refine_points(&super::positions(points), params.smoothness)?;
    Ok(refined
        .into_iter()
        .map(|p| MarginPoint::new(p, REFINED_CONFIDENCE))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelErrorCode;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(4.0, 0.0, 1.0),
            Point3::new(4.0, 4.0, 3.0),
            Point3::new(0.0, 4.0, 3.0),
        ]
    }

    #[test]
    fn test_huge_smoothness_collapses_to_centroid() {
        let refined = refine_points(&square(), 1e9).unwrap();
        for p in refined {
            assert_relative_eq!(p, Point3::new(2.0, 2.0, 2.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_tiny_smoothness_is_identity() {
        let input = square();
        let refined = refine_points(&input, 1e-3).unwrap();
        for (a, b) in refined.iter().zip(&input) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_input_unchanged() {
        let input = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.5, 0.0)];
        assert_eq!(refine_points(&input, 5.0).unwrap(), input);
        assert!(refine_points(&[], 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_circular_symmetry() {
        // A regular polygon stays regular: every point moves toward the
        // center by the same amount.
        let n = 8;
        let input: Vec<Point3<f64>> = (0..n)
            .map(|k| {
                let a = std::f64::consts::TAU * k as f64 / n as f64;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let refined = refine_points(&input, 1.5).unwrap();
        let r0 = refined[0].coords.norm();
        assert!(r0 < 1.0);
        for p in &refined {
            assert_relative_eq!(p.coords.norm(), r0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_refined_confidence() {
        let points: Vec<MarginPoint> = square().into_iter().map(|p| MarginPoint::new(p, 0.85)).collect();
        let refined = refine_margin(&points, &RefineParams::default()).unwrap();
        assert_eq!(refined.len(), 4);
        assert!(refined.iter().all(|p| p.confidence == REFINED_CONFIDENCE));
    }

    #[test]
    fn test_invalid_smoothness() {
        for s in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = refine_points(&square(), s).unwrap_err();
            assert_eq!(err.code(), ModelErrorCode::InvalidParameter);
        }
    }
}
