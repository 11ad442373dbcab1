//! Dental model preparation on top of [`dent_mesh`].
//!
//! # Features
//!
//! - **Orientation**: named view presets or explicit X-Y-Z Euler rotations
//! - **Solidification**: turn an open scan surface into a closed shell with walls
//! - **Margin detection**: height-based margin line extraction with confidences
//! - **Margin refinement**: circular Gaussian smoothing of the margin polyline
//! - **PTS export**: margin points as a text document for downstream CAD
//!
//! Every operation is a synchronous function over in-memory data. File I/O
//! happens at the edges ([`dent_mesh::Mesh::load`], [`ModelingConfig::load`]).
//!
//! # Quick Start
//!
//! ```no_run
//! use dent_mesh::Mesh;
//! use dent_model::{
//!     ModelingConfig, OrientationRequest, detect_margin, export_pts, orient, positions,
//!     refine_margin, solidify,
//! };
//!
//! let config = ModelingConfig::default();
//! let mut scan = Mesh::load("prep.stl").unwrap();
//!
//! orient(&mut scan, &OrientationRequest::preset("occlusalUp"), &config.presets).unwrap();
//!
//! let margin = detect_margin(&scan, &config.margin).unwrap();
//! let margin = refine_margin(&margin, &config.refine).unwrap();
//! let pts = export_pts(&positions(&margin), "1042", "36").unwrap();
//! std::fs::write("margin.pts", pts).unwrap();
//!
//! let solid = solidify(&scan, &config.solidify).unwrap();
//! if !solid.stats.solidified_fully {
//!     eprintln!("fallback: {:?}", solid.stats.fallback_reason);
//! }
//! ```

mod error;

pub mod config;
pub mod info;
pub mod margin;
pub mod orient;
pub mod pts;
pub mod solidify;

pub use error::{ModelError, ModelErrorCode, ModelRecoverySuggestion, ModelResult};

pub use config::ModelingConfig;
pub use info::{ModelBounds, ModelInfo};
pub use margin::{
    MarginDetection, MarginParams, MarginPoint, REFINED_CONFIDENCE, RefineParams, detect_margin,
    detect_margin_detailed, positions, refine_margin, refine_points,
};
pub use orient::{
    OrientationPresets, OrientationRequest, ViewPreset, apply_orientation, orient, rotation_from_degrees,
};
pub use pts::{export_pts, export_pts_at, pts_file_name};
pub use solidify::{SolidifyBuilder, SolidifyParams, SolidifyStats, Solidified, solidify};
