//! # demslope - Terrain Elevation & Slope Library
//!
//! Resolves elevation and local slope for a geographic coordinate, preferring
//! locally stored one-degree DEM tiles and falling back to a remote
//! point-elevation service when no tile covers the point.
//!
//! ## Features
//!
//! - **Tile indexing**: one-degree `N22E078`-style tile names derived from a coordinate
//! - **Formats**: single-band GeoTIFF (`.tif`) and SRTM `.hgt` tiles
//! - **Boundless reads**: windowed reads fill out-of-extent and no-data pixels as missing
//! - **Slope**: Sobel gradient with latitude-dependent metres-per-degree scaling
//! - **Fallback**: best-effort remote elevation lookup with an explicit timeout
//!
//! ## Quick Start
//!
//! ```ignore
//! use demslope::{Coordinate, TerrainResolver};
//!
//! let resolver = TerrainResolver::builder("/data/dem").build()?;
//! let report = resolver.resolve(Coordinate::new(22.7, 78.3))?.into_report();
//! println!("{:?} m, {:?} deg", report.elevation_m, report.slope_deg);
//! ```
//!
//! ## Slope Strategies
//!
//! Two strategies coexist and are selected explicitly through
//! [`SlopeProvider`]:
//!
//! - [`SlopeProvider::RasterDerived`] estimates the slope from the 3×3
//!   neighbourhood of the local tile.
//! - [`SlopeProvider::PredefinedTable`] looks the slope up in a [`SlopeTable`]
//!   keyed by coordinates rounded to 0.1°, with a 15° default.

pub mod coord;
pub mod error;
pub mod raster;
pub mod remote;
pub mod resolver;
pub mod sampler;
pub mod sites;
pub mod slope;
pub mod slope_table;
pub mod store;
pub mod tile_index;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types at crate root for convenience
pub use coord::Coordinate;
pub use error::{Result, TerrainError};
pub use raster::{Neighborhood, RasterTile, TileStatistics};
pub use remote::{ElevationProvider, HttpElevationProvider, RemoteConfig};
pub use resolver::{
    Resolution, SlopeProvider, TerrainReport, TerrainResolver, TerrainResolverBuilder,
};
pub use sampler::{ElevationResult, Provenance};
pub use sites::{SiteLocation, SiteRegistry, SiteReport};
pub use slope::SlopeResult;
pub use slope_table::SlopeTable;
pub use store::TileStore;
pub use tile_index::{locate, TileReference};
pub use transform::GeoTransform;
