// thiserror's generated Display reads struct fields that rustc reports as
// never read.
#![allow(unused_assignments)]

//! Error types for modeling operations.
//!
//! Every error carries a machine-readable code and a recovery suggestion so
//! callers can map failures to their own responses without string matching.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for modeling operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `DENT-XXXX` where:
/// - 1xxx = Input validation errors
/// - 2xxx = Geometry errors
/// - 3xxx = Output errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelErrorCode {
    /// DENT-1001: Neither a known preset nor a usable rotation
    InvalidOrientation = 1001,
    /// DENT-1002: Parameter out of range
    InvalidParameter = 1002,
    /// DENT-1003: Configuration could not be read or parsed
    Config = 1003,
    /// DENT-1004: Underlying mesh could not be loaded or is malformed
    Mesh = 1004,

    /// DENT-2001: No vertex lies above the height threshold
    NoMarginCandidates = 2001,
    /// DENT-2002: Neither solidification path produced a mesh
    SolidificationFailed = 2002,

    /// DENT-3001: Point export failed
    ExportFailed = 3001,
}

impl ModelErrorCode {
    /// Returns the error code as a string in the format `DENT-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelErrorCode::InvalidOrientation => "DENT-1001",
            ModelErrorCode::InvalidParameter => "DENT-1002",
            ModelErrorCode::Config => "DENT-1003",
            ModelErrorCode::Mesh => "DENT-1004",
            ModelErrorCode::NoMarginCandidates => "DENT-2001",
            ModelErrorCode::SolidificationFailed => "DENT-2002",
            ModelErrorCode::ExportFailed => "DENT-3001",
        }
    }
}

impl std::fmt::Display for ModelErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for modeling errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelRecoverySuggestion {
    /// Use one of the named presets.
    UsePreset { available: Vec<String> },
    /// Lower the height offset so more vertices qualify.
    LowerHeightOffset { current: f64 },
    /// Repair the input mesh first.
    RepairInputMesh,
    /// Fix the named parameter.
    FixParameter { name: String },
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for ModelRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelRecoverySuggestion::UsePreset { available } => {
                write!(f, "Use one of the presets: {}", available.join(", "))
            }
            ModelRecoverySuggestion::LowerHeightOffset { current } => {
                write!(f, "Lower the height offset below {:.2}", current)
            }
            ModelRecoverySuggestion::RepairInputMesh => {
                write!(f, "Clean up the scan (remove loose pieces, fix holes) and retry")
            }
            ModelRecoverySuggestion::FixParameter { name } => {
                write!(f, "Check the value of `{}`", name)
            }
            ModelRecoverySuggestion::None => write!(f, "No specific suggestion available"),
        }
    }
}

/// Errors that can occur during modeling operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    /// Orientation request names no known preset and has no usable rotation.
    #[error("invalid orientation: {details}")]
    #[diagnostic(
        code(dent::orient::invalid),
        help("Pass a known preset name or a finite X/Y/Z rotation in degrees.")
    )]
    InvalidOrientation {
        details: String,
        available: Vec<String>,
    },

    /// No vertex lies above the height threshold.
    #[error(
        "no margin candidates: no vertex above z = {threshold:.4} (mean {mean:.4} + {height_offset} x std {std_dev:.4})"
    )]
    #[diagnostic(
        code(dent::margin::no_candidates),
        help("The model may be flat or the height offset too large. Try a smaller height offset.")
    )]
    NoMarginCandidates {
        threshold: f64,
        mean: f64,
        std_dev: f64,
        height_offset: f64,
    },

    /// Neither the stitched nor the fallback solid could be built.
    #[error("solidification failed: {details}")]
    #[diagnostic(
        code(dent::solidify::failed),
        help("The mesh must have at least one face with computable normals and valid indices.")
    )]
    SolidificationFailed { details: String },

    /// Point export failed.
    #[error("export failed: {details}")]
    #[diagnostic(code(dent::export::failed))]
    ExportFailed {
        details: String,
        point_index: Option<usize>,
    },

    /// Parameter out of range.
    #[error("invalid parameter `{name}` = {value}: {details}")]
    #[diagnostic(code(dent::params::invalid))]
    InvalidParameter {
        name: &'static str,
        value: String,
        details: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("invalid configuration: {details}")]
    #[diagnostic(
        code(dent::config::invalid),
        help("Configuration is JSON; omitted fields take their defaults.")
    )]
    Config { details: String },

    /// Underlying mesh error.
    #[error("mesh operation failed: {0}")]
    #[diagnostic(code(dent::mesh::error))]
    Mesh(#[from] dent_mesh::MeshError),
}

impl ModelError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ModelErrorCode {
        match self {
            ModelError::InvalidOrientation { .. } => ModelErrorCode::InvalidOrientation,
            ModelError::NoMarginCandidates { .. } => ModelErrorCode::NoMarginCandidates,
            ModelError::SolidificationFailed { .. } => ModelErrorCode::SolidificationFailed,
            ModelError::ExportFailed { .. } => ModelErrorCode::ExportFailed,
            ModelError::InvalidParameter { .. } => ModelErrorCode::InvalidParameter,
            ModelError::Config { .. } => ModelErrorCode::Config,
            ModelError::Mesh(_) => ModelErrorCode::Mesh,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> ModelRecoverySuggestion {
        match self {
            ModelError::InvalidOrientation { available, .. } => ModelRecoverySuggestion::UsePreset {
                available: available.clone(),
            },
            ModelError::NoMarginCandidates { height_offset, .. } => {
                ModelRecoverySuggestion::LowerHeightOffset {
                    current: *height_offset,
                }
            }
            ModelError::SolidificationFailed { .. } | ModelError::Mesh(_) => {
                ModelRecoverySuggestion::RepairInputMesh
            }
            ModelError::InvalidParameter { name, .. } => ModelRecoverySuggestion::FixParameter {
                name: (*name).to_string(),
            },
            ModelError::ExportFailed { .. } | ModelError::Config { .. } => ModelRecoverySuggestion::None,
        }
    }

    // Constructor helpers

    pub fn invalid_orientation(details: impl Into<String>, available: Vec<String>) -> Self {
        ModelError::InvalidOrientation {
            details: details.into(),
            available,
        }
    }

    pub fn solidification_failed(details: impl Into<String>) -> Self {
        ModelError::SolidificationFailed {
            details: details.into(),
        }
    }

    /// Export error pointing at a specific point.
    pub fn export_failed_at(point_index: usize, details: impl Into<String>) -> Self {
        ModelError::ExportFailed {
            details: details.into(),
            point_index: Some(point_index),
        }
    }

    pub fn invalid_parameter(
        name: &'static str,
        value: impl std::fmt::Display,
        details: impl Into<String>,
    ) -> Self {
        ModelError::InvalidParameter {
            name,
            value: value.to_string(),
            details: details.into(),
        }
    }

    pub fn config(details: impl Into<String>) -> Self {
        ModelError::Config {
            details: details.into(),
        }
    }
}
