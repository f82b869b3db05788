pub mod batch;
pub mod info;
pub mod list;
pub mod query;
pub mod site;

use anyhow::{Context, Result};
use clap::ValueEnum;
use demslope::{
    RemoteConfig, SiteRegistry, SlopeProvider, SlopeTable, TerrainResolver, TileStore,
};
use std::path::PathBuf;
use std::time::Duration;

/// Slope strategy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlopeSource {
    /// Predefined slope lookup table
    Table,
    /// Sobel estimate from the local tile
    Raster,
}

/// Global options shared by every subcommand.
pub struct ResolverOptions {
    pub data_dir: Option<PathBuf>,
    pub slope_source: SlopeSource,
    pub slope_table: Option<PathBuf>,
    pub sites: Option<PathBuf>,
    pub remote_url: String,
    pub offline: bool,
    pub timeout_secs: u64,
}

impl ResolverOptions {
    /// The data directory, which every command needs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir.clone().context(
            "DEMSLOPE_DATA_DIR environment variable not set. Use --data-dir or set DEMSLOPE_DATA_DIR",
        )
    }

    pub fn store(&self) -> Result<TileStore> {
        Ok(TileStore::new(self.data_dir()?))
    }

    /// Whether the remote fallback is enabled.
    pub fn remote_enabled(&self) -> bool {
        !(self.offline
            || self.remote_url.is_empty()
            || self.remote_url.eq_ignore_ascii_case("none")
            || self.remote_url.eq_ignore_ascii_case("off"))
    }

    /// Build a resolver from the options.
    pub fn resolver(&self) -> Result<TerrainResolver> {
        let slope = match self.slope_source {
            SlopeSource::Raster => SlopeProvider::RasterDerived,
            SlopeSource::Table => match &self.slope_table {
                Some(path) => SlopeProvider::PredefinedTable(
                    SlopeTable::from_json_file(path).context("Failed to load slope table")?,
                ),
                None => SlopeProvider::PredefinedTable(SlopeTable::builtin()),
            },
        };

        let sites = match &self.sites {
            Some(path) => SiteRegistry::from_json_file(path).context("Failed to load site registry")?,
            None => SiteRegistry::builtin(),
        };

        let mut builder = TerrainResolver::builder(self.data_dir()?)
            .slope_provider(slope)
            .sites(sites);

        if self.remote_enabled() {
            builder = builder.remote(
                RemoteConfig::default()
                    .with_url(self.remote_url.clone())
                    .with_timeout(Duration::from_secs(self.timeout_secs)),
            );
        }

        builder.build().context("Failed to create terrain resolver")
    }
}

/// Format an optional value with a fixed number of decimals.
pub fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v, unit),
        None => "no data".to_string(),
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ResolverOptions {
        ResolverOptions {
            data_dir: Some(PathBuf::from("/data/dem")),
            slope_source: SlopeSource::Table,
            slope_table: None,
            sites: None,
            remote_url: demslope::remote::DEFAULT_REMOTE_URL.to_string(),
            offline: false,
            timeout_secs: 10,
        }
    }

    #[test]
    fn test_remote_enabled() {
        assert!(options().remote_enabled());
        assert!(!ResolverOptions {
            offline: true,
            ..options()
        }
        .remote_enabled());
        assert!(!ResolverOptions {
            remote_url: "OFF".to_string(),
            ..options()
        }
        .remote_enabled());
    }

    #[test]
    fn test_missing_data_dir() {
        let options = ResolverOptions {
            data_dir: None,
            ..options()
        };
        assert!(options.data_dir().is_err());
    }

    #[test]
    fn test_offline_resolver() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = ResolverOptions {
            data_dir: Some(dir.path().to_path_buf()),
            slope_source: SlopeSource::Raster,
            offline: true,
            ..options()
        };

        let resolver = options.resolver().unwrap();
        assert!(!resolver.has_remote());
        assert_eq!(resolver.slope_provider(), &SlopeProvider::RasterDerived);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_value(Some(512.345), " m"), "512.35 m");
        assert_eq!(format_value(None, " m"), "no data");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(1201 * 1201 * 2), "2.75 MB");
    }
}
