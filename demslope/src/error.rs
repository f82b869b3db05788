//! Error types for the demslope library.
//!
//! Only [`TerrainError::MalformedRaster`] and [`TerrainError::Io`] escape
//! [`TerrainResolver::resolve`](crate::TerrainResolver::resolve). The other
//! variants describe recoverable conditions that degrade to a no-data value.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when resolving terrain attributes.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No local tile file exists for the requested tile.
    #[error("No local tile found for {reference} in {dir}")]
    TileNotFound { reference: String, dir: PathBuf },

    /// Too many missing samples around a point to estimate a gradient.
    #[error("Insufficient neighborhood data: {missing} of {total} samples missing")]
    InsufficientNeighborhoodData { missing: usize, total: usize },

    /// The remote elevation provider failed or returned no usable value.
    #[error("Remote elevation unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    /// A tile file exists but cannot be decoded or georeferenced.
    #[error("Malformed raster {path}: {reason}")]
    MalformedRaster { path: PathBuf, reason: String },

    /// The named site is not present in the registry.
    #[error("Unknown site: {name}")]
    UnknownSite { name: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TerrainError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TerrainError::MalformedRaster {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias using [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;
