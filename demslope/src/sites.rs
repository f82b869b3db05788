//! Named site registry.
//!
//! Maps site names (e.g. mines) to a representative coordinate. An entry is
//! either a direct coordinate or the name of a raster file in the data
//! directory, in which case the centre of that tile's bounding box is used.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "rourkela": { "tile": "n22_e078_1arc_v3.tif" },
//!   "mine_b": { "lat": 15.3, "lon": 76.2 }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::error::{Result, TerrainError};
use crate::store::TileStore;

/// Where a named site is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiteLocation {
    /// A direct coordinate.
    Coordinate { lat: f64, lon: f64 },
    /// The centre of a raster file relative to the data directory.
    Tile { tile: String },
}

/// Terrain attributes for a named site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteReport {
    /// Site name as registered.
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters, `null` for no data.
    pub elevation_m: Option<f64>,
    /// Slope in degrees, `null` for no data.
    pub slope_deg: Option<f64>,
}

/// A case-insensitive registry of named sites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteRegistry {
    sites: HashMap<String, SiteLocation>,
}

impl SiteRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in mine sites.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "rourkela",
            SiteLocation::Tile {
                tile: "n22_e078_1arc_v3.tif".to_string(),
            },
        );
        registry.insert("mine_b", SiteLocation::Coordinate { lat: 15.3, lon: 76.2 });
        registry.insert("mine_c", SiteLocation::Coordinate { lat: 21.5, lon: 83.1 });
        registry
    }

    /// Parse a registry from a JSON object of name → location.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, SiteLocation> = serde_json::from_str(json)
            .map_err(|e| TerrainError::Config(format!("invalid site registry: {e}")))?;

        let mut registry = Self::new();
        for (name, location) in entries {
            registry.insert(&name, location);
        }
        Ok(registry)
    }

    /// Load a registry from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TerrainError::Config(format!(
                "cannot read site registry {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&json)
    }

    /// Add or replace a site. Names are stored lowercase.
    pub fn insert(&mut self, name: &str, location: SiteLocation) {
        self.sites.insert(name.to_lowercase(), location);
    }

    /// Look up a site by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&SiteLocation> {
        self.sites.get(&name.to_lowercase())
    }

    /// Registered site names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Resolve a site name to its representative coordinate.
    ///
    /// # Errors
    ///
    /// - [`TerrainError::UnknownSite`] if the name is not registered
    /// - [`TerrainError::TileNotFound`] if a tile entry's file is missing
    /// - [`TerrainError::MalformedRaster`] if a tile entry's file cannot be read
    pub fn locate_site(&self, name: &str, store: &TileStore) -> Result<Coordinate> {
        match self.get(name) {
            Some(SiteLocation::Coordinate { lat, lon }) => Ok(Coordinate::new(*lat, *lon)),
            Some(SiteLocation::Tile { tile }) => Ok(store.open_file(tile)?.center()),
            None => Err(TerrainError::UnknownSite {
                name: name.to_string(),
            }),
        }
    }
}
