//! Geographic coordinates.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in decimal degrees.
///
/// Values are not validated or normalized; latitude is conventionally in
/// `[-90, 90]` and longitude in `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (positive = north).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive = east).
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for Coordinate {
    /// Converts a `(lat, lon)` pair.
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}
