//! Mesh errors with machine-readable codes and recovery hints.
//!
//! Codes print as `MESH-NNNN`. The thousands digit groups them:
//! 1 for STL files and streams, 2 for mesh data that cannot be processed,
//! 3 for repairs that gave up.
//!
//! ```
//! use dent_mesh::{ErrorCode, MeshError};
//!
//! let err = MeshError::invalid_vertex_index(5, 100, 50);
//! assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
//! assert_eq!(err.code().to_string(), "MESH-2001");
//! ```

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Stable numeric identity of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    IoRead = 1001,
    IoWrite = 1002,
    ParseError = 1003,
    UnsupportedFormat = 1004,

    InvalidVertexIndex = 2001,
    InvalidCoordinate = 2002,
    EmptyMesh = 2003,

    HoleFillFailed = 3001,
}

impl ErrorCode {
    pub fn number(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MESH-{}", self.number())
    }
}

/// What a user can do about a [`MeshError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Export the scan again from the scanner or CAD software.
    ReexportScan { format: Option<&'static str> },
    /// The file system refused the read or write.
    CheckFileAccess { path: PathBuf, writing: bool },
    /// Look at the scan itself for the listed problems.
    InspectScan { look_for: Vec<&'static str> },
    /// Automatic repair is not enough; fix the scan by hand.
    CloseInScannerSoftware,
}

impl fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoverySuggestion::ReexportScan { format: Some(format) } => {
                write!(f, "Export the scan again as {}", format)
            }
            RecoverySuggestion::ReexportScan { format: None } => write!(f, "Export the scan again"),
            RecoverySuggestion::CheckFileAccess { path, writing: false } => {
                write!(f, "Make sure {} exists and is readable", path.display())
            }
            RecoverySuggestion::CheckFileAccess { path, writing: true } => {
                write!(f, "Make sure the folder of {} exists and is writable", path.display())
            }
            RecoverySuggestion::InspectScan { look_for } => {
                write!(f, "Inspect the scan for {}", look_for.join(" or "))
            }
            RecoverySuggestion::CloseInScannerSoftware => {
                write!(f, "Close the opening in the scanner software, then retry")
            }
        }
    }
}

/// Where in the input a [`MeshError`] was found.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshLocation {
    Vertex { index: usize },
    Face { index: usize },
    File { path: PathBuf },
}

impl fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLocation::Vertex { index } => write!(f, "vertex #{}", index),
            MeshLocation::Face { index } => write!(f, "face #{}", index),
            MeshLocation::File { path } => write!(f, "file {}", path.display()),
        }
    }
}

/// Errors from loading, validating or repairing a mesh.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    #[error("cannot read {path}")]
    #[diagnostic(code(dent_mesh::io::read))]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}")]
    #[diagnostic(code(dent_mesh::io::write))]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name} is not a readable STL: {details}")]
    #[diagnostic(
        code(dent_mesh::io::parse),
        help("Binary and ASCII STL are accepted.")
    )]
    ParseError { source_name: String, details: String },

    #[error("unsupported file type {extension:?}, expected .stl")]
    #[diagnostic(code(dent_mesh::io::format))]
    UnsupportedFormat { extension: Option<String> },

    #[error("face {face_index} points at vertex {vertex_index}, but there are only {vertex_count} vertices")]
    #[diagnostic(code(dent_mesh::data::vertex_index))]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    #[error("vertex {vertex_index} has {coordinate} = {value}")]
    #[diagnostic(
        code(dent_mesh::data::coordinate),
        help("Coordinates must be finite numbers.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    #[error("empty mesh: {details}")]
    #[diagnostic(code(dent_mesh::data::empty))]
    EmptyMesh { details: String },

    #[error("could not fill hole: {details}")]
    #[diagnostic(code(dent_mesh::repair::hole_fill))]
    HoleFillFailed { details: String },
}

impl MeshError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::IoRead { .. } => ErrorCode::IoRead,
            MeshError::IoWrite { .. } => ErrorCode::IoWrite,
            MeshError::ParseError { .. } => ErrorCode::ParseError,
            MeshError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            MeshError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::HoleFillFailed { .. } => ErrorCode::HoleFillFailed,
        }
    }

    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MeshError::IoRead { path, .. } => RecoverySuggestion::CheckFileAccess {
                path: path.clone(),
                writing: false,
            },
            MeshError::IoWrite { path, .. } => RecoverySuggestion::CheckFileAccess {
                path: path.clone(),
                writing: true,
            },
            MeshError::ParseError { .. } | MeshError::UnsupportedFormat { .. } => {
                RecoverySuggestion::ReexportScan {
                    format: Some("binary STL"),
                }
            }
            MeshError::InvalidVertexIndex { .. } => RecoverySuggestion::ReexportScan { format: None },
            MeshError::InvalidCoordinate { .. } => RecoverySuggestion::InspectScan {
                look_for: vec!["stray far-away points", "corrupted export"],
            },
            MeshError::EmptyMesh { .. } => RecoverySuggestion::InspectScan {
                look_for: vec!["missing geometry", "a cropped-away region"],
            },
            MeshError::HoleFillFailed { .. } => RecoverySuggestion::CloseInScannerSoftware,
        }
    }

    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            MeshError::IoRead { path, .. } | MeshError::IoWrite { path, .. } => {
                Some(MeshLocation::File { path: path.clone() })
            }
            MeshError::InvalidVertexIndex { face_index, .. } => {
                Some(MeshLocation::Face { index: *face_index })
            }
            MeshError::InvalidCoordinate { vertex_index, .. } => {
                Some(MeshLocation::Vertex { index: *vertex_index })
            }
            _ => None,
        }
    }

    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoRead {
            path: path.into(),
            source,
        }
    }

    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoWrite {
            path: path.into(),
            source,
        }
    }

    pub fn parse_error(source_name: impl Into<String>, details: impl Into<String>) -> Self {
        MeshError::ParseError {
            source_name: source_name.into(),
            details: details.into(),
        }
    }

    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        MeshError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    pub fn hole_fill_failed(details: impl Into<String>) -> Self {
        MeshError::HoleFillFailed {
            details: details.into(),
        }
    }
}
