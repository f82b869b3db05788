//! Terrain resolution façade.
//!
//! [`TerrainResolver`] ties the pieces together: for a coordinate it opens the
//! covering local tile (once), samples elevation, and applies the configured
//! [`SlopeProvider`]. When no local tile exists, elevation falls back to the
//! remote [`ElevationProvider`] if one is configured.
//!
//! The resolver holds no mutable state; every call opens and drops its own
//! tile, so a shared `&TerrainResolver` can serve concurrent callers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::error::{Result, TerrainError};
use crate::remote::{ElevationProvider, HttpElevationProvider, RemoteConfig, DEFAULT_TIMEOUT_SECS};
use crate::sampler::{sample, ElevationResult, Provenance};
use crate::sites::{SiteRegistry, SiteReport};
use crate::slope::{estimate_slope, SlopeResult};
use crate::slope_table::SlopeTable;
use crate::store::TileStore;
use crate::tile_index::locate;

/// Strategy used to obtain slope values.
#[derive(Debug, Clone, PartialEq)]
pub enum SlopeProvider {
    /// Sobel estimate from the local tile; no tile means no slope.
    RasterDerived,
    /// Keyed lookup in a table of known slopes; always yields a value.
    PredefinedTable(SlopeTable),
}

impl SlopeProvider {
    /// Short name used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            SlopeProvider::RasterDerived => "raster",
            SlopeProvider::PredefinedTable(_) => "table",
        }
    }
}

impl Default for SlopeProvider {
    fn default() -> Self {
        SlopeProvider::PredefinedTable(SlopeTable::builtin())
    }
}

/// Elevation and slope resolved for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub elevation: ElevationResult,
    pub slope: SlopeResult,
}

impl Resolution {
    /// Consumer-facing form, without provenance.
    pub fn into_report(self) -> TerrainReport {
        TerrainReport {
            latitude: self.coordinate.latitude,
            longitude: self.coordinate.longitude,
            elevation_m: self.elevation.meters(),
            slope_deg: self.slope.degrees(),
        }
    }
}

/// Terrain attributes for a coordinate; `null` marks no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainReport {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: Option<f64>,
    pub slope_deg: Option<f64>,
}

/// Resolves elevation and slope for coordinates and named sites.
///
/// # Example
///
/// ```ignore
/// use demslope::{Coordinate, SlopeProvider, TerrainResolver};
///
/// let resolver = TerrainResolver::builder("/data/dem")
///     .slope_provider(SlopeProvider::RasterDerived)
///     .build()?;
///
/// let resolution = resolver.resolve(Coordinate::new(22.7, 78.3))?;
/// println!("{:?}", resolution.elevation.meters());
/// ```
pub struct TerrainResolver {
    store: TileStore,
    remote: Option<Box<dyn ElevationProvider>>,
    slope: SlopeProvider,
    sites: SiteRegistry,
}

impl TerrainResolver {
    /// Create a builder for a resolver over `data_dir`.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> TerrainResolverBuilder {
        TerrainResolverBuilder::new(data_dir)
    }

    /// Resolve elevation and slope at `coordinate`.
    ///
    /// Missing tiles, no-data pixels, sparse neighbourhoods and remote
    /// failures all degrade to no-data values.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MalformedRaster`] or [`TerrainError::Io`] if the
    /// covering tile exists but cannot be read.
    pub fn resolve(&self, coordinate: Coordinate) -> Result<Resolution> {
        let reference = locate(coordinate);

        let (elevation, slope) = match self.store.open(reference) {
            Ok(tile) => {
                let elevation = sample(&tile, coordinate)?;
                let slope = match &self.slope {
                    SlopeProvider::RasterDerived => estimate_slope(&tile, coordinate)?,
                    SlopeProvider::PredefinedTable(table) => {
                        SlopeResult::Degrees(table.lookup(coordinate))
                    }
                };
                (elevation, slope)
            }
            Err(TerrainError::TileNotFound { .. }) => {
                tracing::debug!(tile = %reference, "No local tile");

                let elevation = match &self.remote {
                    Some(remote) => remote.fetch_elevation(coordinate),
                    None => ElevationResult::no_data(Provenance::Local),
                };
                let slope = match &self.slope {
                    SlopeProvider::RasterDerived => SlopeResult::NoData,
                    SlopeProvider::PredefinedTable(table) => {
                        SlopeResult::Degrees(table.lookup(coordinate))
                    }
                };
                (elevation, slope)
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            provenance = ?elevation.provenance(),
            elevation = ?elevation.meters(),
            slope = ?slope.degrees(),
            "Resolved terrain"
        );

        Ok(Resolution {
            coordinate,
            elevation,
            slope,
        })
    }

    /// Resolve the terrain at a named site.
    ///
    /// # Errors
    ///
    /// - [`TerrainError::UnknownSite`] if the name is not registered
    /// - [`TerrainError::TileNotFound`] if the site's tile file is missing
    /// - Any error from [`Self::resolve`]
    pub fn resolve_site(&self, name: &str) -> Result<SiteReport> {
        let coordinate = self.sites.locate_site(name, &self.store)?;
        let report = self.resolve(coordinate)?.into_report();

        Ok(SiteReport {
            name: name.to_lowercase(),
            latitude: report.latitude,
            longitude: report.longitude,
            elevation_m: report.elevation_m,
            slope_deg: report.slope_deg,
        })
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        self.store.data_dir()
    }

    /// Get the tile store.
    pub fn store(&self) -> &TileStore {
        &self.store
    }

    /// Get the configured slope strategy.
    pub fn slope_provider(&self) -> &SlopeProvider {
        &self.slope
    }

    /// Check if a remote elevation fallback is configured.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Get the site registry.
    pub fn sites(&self) -> &SiteRegistry {
        &self.sites
    }
}

/// Builder for [`TerrainResolver`].
///
/// Defaults: no remote fallback, the built-in slope table, and the
/// built-in site registry.
pub struct TerrainResolverBuilder {
    data_dir: PathBuf,
    remote_config: Option<RemoteConfig>,
    remote_provider: Option<Box<dyn ElevationProvider>>,
    slope: SlopeProvider,
    sites: SiteRegistry,
}

impl TerrainResolverBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            remote_config: None,
            remote_provider: None,
            slope: SlopeProvider::default(),
            sites: SiteRegistry::builtin(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DEMSLOPE_DATA_DIR` | Directory containing DEM tiles | Required |
    /// | `DEMSLOPE_REMOTE_URL` | Point-elevation endpoint, `none`/`off` to disable | OpenTopoData srtm90m |
    /// | `DEMSLOPE_REMOTE_TIMEOUT_SECS` | Remote request timeout | 10 |
    /// | `DEMSLOPE_SLOPE_SOURCE` | `table` or `raster` | `table` |
    /// | `DEMSLOPE_SLOPE_TABLE` | JSON slope table | Built-in table |
    /// | `DEMSLOPE_SITES` | JSON site registry | Built-in sites |
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Config`] if `DEMSLOPE_DATA_DIR` is not set, the
    /// slope source is unknown, or a configured JSON file cannot be loaded.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var_os("DEMSLOPE_DATA_DIR").ok_or_else(|| {
            TerrainError::Config("DEMSLOPE_DATA_DIR environment variable not set".to_string())
        })?;

        Self::from_env_in(PathBuf::from(data_dir))
    }

    /// Like [`from_env`](Self::from_env), but uses `default_data_dir` when
    /// `DEMSLOPE_DATA_DIR` is not set.
    ///
    /// The environment is only read, never modified.
    pub fn from_env_or<P: AsRef<Path>>(default_data_dir: P) -> Result<Self> {
        let data_dir = std::env::var_os("DEMSLOPE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir.as_ref().to_path_buf());

        Self::from_env_in(data_dir)
    }

    fn from_env_in(data_dir: PathBuf) -> Result<Self> {
        let timeout_secs: u64 = std::env::var("DEMSLOPE_REMOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let remote_config = match std::env::var("DEMSLOPE_REMOTE_URL") {
            Ok(url) if url.eq_ignore_ascii_case("none") || url.eq_ignore_ascii_case("off") => {
                None
            }
            Ok(url) if !url.is_empty() => Some(RemoteConfig::default().with_url(url)),
            _ => Some(RemoteConfig::default()),
        }
        .map(|config| config.with_timeout(Duration::from_secs(timeout_secs)));

        let source = std::env::var("DEMSLOPE_SLOPE_SOURCE").unwrap_or_else(|_| "table".into());
        let slope = match source.to_lowercase().as_str() {
            "raster" => SlopeProvider::RasterDerived,
            "table" => match std::env::var("DEMSLOPE_SLOPE_TABLE") {
                Ok(path) => SlopeProvider::PredefinedTable(SlopeTable::from_json_file(path)?),
                Err(_) => SlopeProvider::default(),
            },
            other => {
                return Err(TerrainError::Config(format!(
                    "unknown slope source '{}' (expected 'table' or 'raster')",
                    other
                )))
            }
        };

        let sites = match std::env::var("DEMSLOPE_SITES") {
            Ok(path) => SiteRegistry::from_json_file(path)?,
            Err(_) => SiteRegistry::builtin(),
        };

        Ok(Self {
            data_dir,
            remote_config,
            remote_provider: None,
            slope,
            sites,
        })
    }

    /// Set the data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Enable the HTTP remote fallback with the given configuration.
    pub fn remote(mut self, config: RemoteConfig) -> Self {
        self.remote_config = Some(config);
        self
    }

    /// Use a custom remote elevation provider.
    ///
    /// Takes precedence over [`Self::remote`].
    pub fn remote_provider(mut self, provider: Box<dyn ElevationProvider>) -> Self {
        self.remote_provider = Some(provider);
        self
    }

    /// Disable the remote fallback.
    pub fn offline(mut self) -> Self {
        self.remote_config = None;
        self.remote_provider = None;
        self
    }

    /// Set the slope strategy.
    pub fn slope_provider(mut self, slope: SlopeProvider) -> Self {
        self.slope = slope;
        self
    }

    /// Set the site registry.
    pub fn sites(mut self, sites: SiteRegistry) -> Self {
        self.sites = sites;
        self
    }

    /// Build the [`TerrainResolver`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the remote fallback cannot be
    /// created.
    pub fn build(self) -> Result<TerrainResolver> {
        let remote: Option<Box<dyn ElevationProvider>> = match (self.remote_provider, self.remote_config) {
            (Some(provider), _) => Some(provider),
            (None, Some(config)) => Some(Box::new(HttpElevationProvider::new(config)?)),
            (None, None) => None,
        };

        Ok(TerrainResolver {
            store: TileStore::new(self.data_dir),
            remote,
            slope: self.slope,
            sites: self.sites,
        })
    }
}
