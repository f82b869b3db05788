//! Predefined slope lookup table.
//!
//! A coarse, deterministic slope source: coordinates are rounded to one
//! decimal degree and looked up in a table of known terrain slopes, with a
//! fixed default when no entry matches.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "default_deg": 15.0,
//!   "entries": [
//!     { "lat": 23.0, "lon": 86.5, "slope_deg": 28.0 }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::coord::Coordinate;
use crate::error::{Result, TerrainError};

/// Slope returned for coordinates with no table entry.
pub const DEFAULT_SLOPE_DEG: f64 = 15.0;

/// Known mine-region slopes as `(lat, lon, slope_deg)`.
const BUILTIN_SLOPES: [(f64, f64, f64); 10] = [
    // Indian mines
    (22.5, 78.5, 12.0), // Madhya Pradesh
    (22.5, 82.5, 18.0), // Chhattisgarh
    (22.5, 84.5, 22.0), // Odisha (bauxite/iron ore hills)
    (22.5, 85.5, 25.0), // Odisha/Jharkhand
    (23.0, 86.5, 28.0), // Jharia coalfield
    (24.0, 82.5, 15.0), // MP/Jharkhand border
    (15.5, 76.5, 20.0), // Karnataka (Bellary iron ore mines)
    // Global mines
    (37.5, -81.5, 20.0), // West Virginia coal mines
    (51.5, 7.5, 10.0),   // Ruhr Valley, Germany
    (-26.5, 27.5, 30.0), // South Africa gold mines
];

/// Table key: coordinate in tenths of a degree.
type Key = (i32, i32);

fn key(coordinate: Coordinate) -> Key {
    (tenths(coordinate.latitude), tenths(coordinate.longitude))
}

/// Round to one decimal using the exact value of the double.
///
/// `22.45` is stored just below 22.45 and becomes `224`, whereas
/// `(22.45 * 10.0).round()` would see the product `224.5` and give `225`.
fn tenths(value: f64) -> i32 {
    format!("{:.1}", value)
        .parse::<f64>()
        .map_or(value * 10.0, |rounded| rounded * 10.0)
        .round() as i32
}

/// A slope table keyed by coordinates rounded to 0.1°.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeTable {
    entries: HashMap<Key, f64>,
    default_deg: f64,
}

#[derive(Deserialize)]
struct TableFile {
    #[serde(default = "default_slope")]
    default_deg: f64,
    #[serde(default)]
    entries: Vec<TableEntry>,
}

#[derive(Deserialize)]
struct TableEntry {
    lat: f64,
    lon: f64,
    slope_deg: f64,
}

fn default_slope() -> f64 {
    DEFAULT_SLOPE_DEG
}

impl Default for SlopeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SlopeTable {
    /// An empty table returning `default_deg` everywhere.
    pub fn empty(default_deg: f64) -> Self {
        Self {
            entries: HashMap::new(),
            default_deg,
        }
    }

    /// The built-in table of mine regions with the 15° default.
    pub fn builtin() -> Self {
        let mut table = Self::empty(DEFAULT_SLOPE_DEG);
        for (lat, lon, slope) in BUILTIN_SLOPES {
            table.insert(Coordinate::new(lat, lon), slope);
        }
        table
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TableFile = serde_json::from_str(json)
            .map_err(|e| TerrainError::Config(format!("invalid slope table: {e}")))?;

        let mut table = Self::empty(file.default_deg);
        for entry in file.entries {
            table.insert(Coordinate::new(entry.lat, entry.lon), entry.slope_deg);
        }
        Ok(table)
    }

    /// Load a table from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TerrainError::Config(format!(
                "cannot read slope table {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&json)
    }

    /// Add or replace the slope for the 0.1° cell containing `coordinate`.
    pub fn insert(&mut self, coordinate: Coordinate, slope_deg: f64) {
        self.entries.insert(key(coordinate), slope_deg);
    }

    /// Slope for `coordinate`, or the default when no entry matches.
    pub fn lookup(&self, coordinate: Coordinate) -> f64 {
        self.get(coordinate).unwrap_or(self.default_deg)
    }

    /// Slope for `coordinate` if the table has an entry.
    pub fn get(&self, coordinate: Coordinate) -> Option<f64> {
        self.entries.get(&key(coordinate)).copied()
    }

    /// The default slope.
    pub fn default_deg(&self) -> f64 {
        self.default_deg
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let table = SlopeTable::builtin();

        assert_eq!(table.len(), 10);
        assert_eq!(table.lookup(Coordinate::new(23.0, 86.5)), 28.0);
        assert_eq!(table.lookup(Coordinate::new(-26.5, 27.5)), 30.0);
        assert_eq!(table.lookup(Coordinate::new(37.5, -81.5)), 20.0);
    }

    #[test]
    fn test_unlisted_returns_default() {
        let table = SlopeTable::builtin();

        assert_eq!(table.lookup(Coordinate::new(10.0, 10.0)), 15.0);
        assert_eq!(table.get(Coordinate::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let table = SlopeTable::builtin();

        assert_eq!(table.lookup(Coordinate::new(22.96, 86.54)), 28.0);
        assert_eq!(table.lookup(Coordinate::new(23.04, 86.46)), 28.0);
        assert_eq!(table.lookup(Coordinate::new(23.06, 86.5)), DEFAULT_SLOPE_DEG);
    }

    #[test]
    fn test_rounding_uses_stored_decimal_value() {
        assert_eq!(tenths(22.45), 224);
        assert_eq!(tenths(22.46), 225);
        assert_eq!(tenths(-22.45), -224);
        assert_eq!(tenths(-0.04), 0);

        let mut table = SlopeTable::empty(DEFAULT_SLOPE_DEG);
        table.insert(Coordinate::new(22.4, 85.5), 33.0);
        assert_eq!(table.lookup(Coordinate::new(22.45, 85.5)), 33.0);
        assert_eq!(table.lookup(Coordinate::new(22.46, 85.5)), DEFAULT_SLOPE_DEG);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "default_deg": 9.5,
            "entries": [
                { "lat": 12.3, "lon": 45.6, "slope_deg": 33.0 }
            ]
        }"#;
        let table = SlopeTable::from_json(json).unwrap();

        assert_eq!(table.lookup(Coordinate::new(12.3, 45.6)), 33.0);
        assert_eq!(table.lookup(Coordinate::new(23.0, 86.5)), 9.5);
    }

    #[test]
    fn test_from_json_default_is_optional() {
        let table = SlopeTable::from_json(r#"{"entries": []}"#).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.default_deg(), DEFAULT_SLOPE_DEG);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = SlopeTable::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, TerrainError::Config(_)));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = SlopeTable::from_json_file("/definitely/missing/slopes.json").unwrap_err();
        assert!(matches!(err, TerrainError::Config(_)));
    }
}
