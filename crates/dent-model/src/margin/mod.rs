//! Margin line detection and refinement.
//!
//! The margin is the closed curve where a preparation meets the rest of the
//! tooth. [`detect`] finds an ordered polyline approximating it from the mesh
//! heights; [`refine`] smooths that polyline as a closed curve.

pub mod detect;
pub mod refine;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

pub use detect::{MarginDetection, MarginParams, detect_margin, detect_margin_detailed};
pub use refine::{REFINED_CONFIDENCE, RefineParams, refine_margin, refine_points};

/// One margin point with a confidence in `[0, 1]`.
///
/// Serializes flat as `{"x", "y", "z", "confidence"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub confidence: f64,
}

impl MarginPoint {
    pub fn new(position: Point3<f64>, confidence: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            confidence,
        }
    }

    #[inline]
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Positions of a margin polyline, in order.
pub fn positions(points: &[MarginPoint]) -> Vec<Point3<f64>> {
    points.iter().map(MarginPoint::position).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_point_json_shape() {
        let p = MarginPoint::new(Point3::new(1.0, -2.5, 3.0), 0.9);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":-2.5,"z":3.0,"confidence":0.9}"#);

        let back: MarginPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position(), Point3::new(1.0, -2.5, 3.0));
    }
}
