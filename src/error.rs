//! Error types for the store, I/O and configuration layers

use crate::model::{AreaId, ContourId};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a geometry store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A geometry primitive rejected its input
    ///
    /// Zero-length lines, too few vertices, self-intersecting input or a
    /// failure inside the boolean-operation backend.
    #[error("{operation} failed: {reason}")]
    GeometryOperation {
        operation: &'static str,
        reason: String,
    },

    /// No area row with this identifier
    #[error("Unknown area {0}")]
    UnknownArea(AreaId),

    /// No contour row with this identifier
    #[error("Unknown contour {0}")]
    UnknownContour(ContourId),

    /// The backing store could not be reached
    #[error("Geometry store unavailable: {0}")]
    Connectivity(String),
}

impl StoreError {
    pub(crate) fn geometry(operation: &'static str, reason: impl Into<String>) -> Self {
        StoreError::GeometryOperation {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether the engine may skip the offending pair and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::GeometryOperation { .. })
    }
}

/// Errors reading or writing GeoJSON collections
#[derive(Debug, Error)]
pub enum IoError {
    #[error("Failed to access {path}: {source}")]
    File { path: PathBuf, source: io::Error },

    #[error("Invalid GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        source: geojson::Error,
    },

    /// Feature is missing its elevation, or it is not an integer
    #[error("Feature {index} has no integer '{property}' property")]
    MissingElevation { index: usize, property: String },

    #[error("Feature {index} has unsupported geometry: {kind}")]
    UnsupportedGeometry { index: usize, kind: String },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Any failure of a full run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
