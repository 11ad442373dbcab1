//! PTS export of margin points.
//!
//! A PTS document is a four-line `#` header, a blank line, then one
//! `x y z` line per point with six decimals.

use chrono::{DateTime, Utc};
use nalgebra::Point3;
use tracing::info;

use crate::error::{ModelError, ModelResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render `points` as a PTS document stamped with the current UTC time.
pub fn export_pts(points: &[Point3<f64>], case_id: &str, tooth_number: &str) -> ModelResult<String> {
    export_pts_at(points, case_id, tooth_number, Utc::now())
}

/// Render `points` as a PTS document with an explicit timestamp.
pub fn export_pts_at(
    points: &[Point3<f64>],
    case_id: &str,
    tooth_number: &str,
    generated: DateTime<Utc>,
) -> ModelResult<String> {
    let mut out = String::with_capacity(128 + points.len() * 40);
    out.push_str(&format!("# Margin Points for Case {}\n", case_id));
    out.push_str(&format!("# Tooth: {}\n", tooth_number));
    out.push_str(&format!("# Generated: {}\n", generated.format(TIMESTAMP_FORMAT)));
    out.push_str(&format!("# Point Count: {}\n\n", points.len()));

    for (i, p) in points.iter().enumerate() {
        if let Some(axis) = non_finite_axis(p) {
            return Err(ModelError::export_failed_at(
                i,
                format!("point {} has non-finite {} coordinate", i, axis),
            ));
        }
        out.push_str(&format!("{:.6} {:.6} {:.6}\n", p.x, p.y, p.z));
    }

    info!(
        "Exported {} margin points for case {} tooth {}",
        points.len(),
        case_id,
        tooth_number
    );
    Ok(out)
}

/// Conventional file name for an exported margin.
pub fn pts_file_name(case_id: &str, tooth_number: &str) -> String {
    format!("margin_{}_tooth{}.pts", case_id, tooth_number)
}

fn non_finite_axis(p: &Point3<f64>) -> Option<&'static str> {
    [("x", p.x), ("y", p.y), ("z", p.z)]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(axis, _)| axis)
}
