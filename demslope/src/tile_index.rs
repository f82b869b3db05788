//! One-degree tile indexing.
//!
//! This module maps a coordinate to the identity of the DEM tile that should
//! contain it. It performs no I/O; whether the tile exists on disk is decided
//! by [`TileStore`](crate::TileStore).
//!
//! # Naming Convention
//!
//! Tiles follow the SRTM naming convention: `{N|S}{lat}{E|W}{lon}`
//!
//! - Latitude: 2 digits with N/S prefix (e.g., N22, S13)
//! - Longitude: 3 digits with E/W prefix (e.g., E078, W078)
//!
//! The name represents the **southwest corner** of the 1° × 1° tile. A compact
//! form without zero padding (`N22E78`) is also recognised.

use std::fmt;

use crate::coord::Coordinate;

/// Identity of the one-degree tile covering a coordinate.
///
/// Holds the integer degree anchors `(floor(lat), floor(lon))` of the tile's
/// southwest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileReference {
    lat: i32,
    lon: i32,
}

impl TileReference {
    /// Create a reference from integer southwest-corner anchors.
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Latitude of the southwest corner.
    pub fn lat(&self) -> i32 {
        self.lat
    }

    /// Longitude of the southwest corner.
    pub fn lon(&self) -> i32 {
        self.lon
    }

    /// Canonical zero-padded name, e.g. `N22E078`.
    ///
    /// # Examples
    ///
    /// ```
    /// use demslope::{locate, Coordinate};
    ///
    /// assert_eq!(locate(Coordinate::new(22.7, 78.3)).name(), "N22E078");
    /// assert_eq!(locate(Coordinate::new(-12.3, -77.1)).name(), "S13W078");
    /// assert_eq!(locate(Coordinate::new(0.5, -0.5)).name(), "N00W001");
    /// ```
    pub fn name(&self) -> String {
        format!(
            "{}{:02}{}{:03}",
            self.lat_prefix(),
            self.lat.unsigned_abs(),
            self.lon_prefix(),
            self.lon.unsigned_abs()
        )
    }

    /// Compact name without zero padding, e.g. `N22E78`.
    pub fn compact_name(&self) -> String {
        format!(
            "{}{}{}{}",
            self.lat_prefix(),
            self.lat.unsigned_abs(),
            self.lon_prefix(),
            self.lon.unsigned_abs()
        )
    }

    /// File stems to probe on disk, canonical first.
    pub fn file_stems(&self) -> Vec<String> {
        let canonical = self.name();
        let compact = self.compact_name();
        if canonical == compact {
            vec![canonical]
        } else {
            vec![canonical, compact]
        }
    }

    fn lat_prefix(&self) -> char {
        if self.lat >= 0 {
            'N'
        } else {
            'S'
        }
    }

    fn lon_prefix(&self) -> char {
        if self.lon >= 0 {
            'E'
        } else {
            'W'
        }
    }
}

impl fmt::Display for TileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Map a coordinate to the tile that should contain it.
///
/// Uses `floor(latitude)` and `floor(longitude)` as the tile anchors, so every
/// coordinate inside `[lat, lat+1) × [lon, lon+1)` maps to the same tile.
/// Indexing always succeeds.
pub fn locate(coordinate: Coordinate) -> TileReference {
    TileReference::new(
        coordinate.latitude.floor() as i32,
        coordinate.longitude.floor() as i32,
    )
}

/// Parse a tile name to recover its southwest-corner anchors.
///
/// Accepts either the canonical or the compact form, with or without a leading
/// path and a file extension, in any letter case.
///
/// # Examples
///
/// ```
/// use demslope::tile_index::parse_tile_name;
///
/// let tile = parse_tile_name("N22E078.tif").unwrap();
/// assert_eq!((tile.lat(), tile.lon()), (22, 78));
/// let tile = parse_tile_name("/data/s13w78.hgt").unwrap();
/// assert_eq!((tile.lat(), tile.lon()), (-13, -78));
/// assert!(parse_tile_name("invalid").is_none());
/// ```
pub fn parse_tile_name(filename: &str) -> Option<TileReference> {
    // Extract just the filename if a path is given
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    // Drop any extension
    let name = name.split('.').next().unwrap_or(name);
    let upper = name.to_ascii_uppercase();

    let lat_sign = match upper.chars().next()? {
        'N' => 1,
        'S' => -1,
        _ => return None,
    };
    let rest = &upper[1..];
    let split = rest.find(['E', 'W'])?;
    let lon_sign = if rest[split..].starts_with('E') { 1 } else { -1 };

    let lat_digits = &rest[..split];
    let lon_digits = &rest[split + 1..];
    if !is_degree_digits(lat_digits, 2) || !is_degree_digits(lon_digits, 3) {
        return None;
    }

    let lat: i32 = lat_digits.parse().ok()?;
    let lon: i32 = lon_digits.parse().ok()?;

    Some(TileReference::new(lat * lat_sign, lon * lon_sign))
}

fn is_degree_digits(digits: &str, max_len: usize) -> bool {
    !digits.is_empty() && digits.len() <= max_len && digits.bytes().all(|b| b.is_ascii_digit())
}
