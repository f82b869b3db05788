//! Nearest-pixel elevation sampling.

use crate::coord::Coordinate;
use crate::error::Result;
use crate::raster::RasterTile;

/// Where an elevation value came from.
///
/// Used for log lines and error reporting; it is not part of the
/// consumer-facing [`TerrainReport`](crate::TerrainReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Read from a local tile.
    Local,
    /// Fetched from the remote elevation provider.
    Remote,
}

/// An elevation value, or no data, tagged by provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationResult {
    meters: Option<f64>,
    provenance: Provenance,
}

impl ElevationResult {
    /// A known elevation in meters.
    pub fn value(meters: f64, provenance: Provenance) -> Self {
        Self {
            meters: Some(meters),
            provenance,
        }
    }

    /// No elevation available.
    pub fn no_data(provenance: Provenance) -> Self {
        Self {
            meters: None,
            provenance,
        }
    }

    /// Elevation in meters, `None` for no data.
    pub fn meters(&self) -> Option<f64> {
        self.meters
    }

    /// Check if no elevation is available.
    pub fn is_no_data(&self) -> bool {
        self.meters.is_none()
    }

    /// Source of the result.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }
}

/// Sample the elevation of the pixel containing `coordinate`.
///
/// Reads the single centre pixel (no interpolation). Out-of-extent and
/// no-data pixels yield [`ElevationResult::no_data`].
///
/// # Errors
///
/// Returns [`TerrainError::MalformedRaster`](crate::TerrainError::MalformedRaster)
/// if the tile's transform cannot be inverted.
pub fn sample(tile: &RasterTile, coordinate: Coordinate) -> Result<ElevationResult> {
    let (row, col) = tile.pixel_index(coordinate)?;

    Ok(match tile.read_window(row, col, 0).center() {
        Some(meters) => ElevationResult::value(meters, Provenance::Local),
        None => ElevationResult::no_data(Provenance::Local),
    })
}
