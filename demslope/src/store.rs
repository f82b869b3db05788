//! Tile store rooted at a data directory.
//!
//! [`TileStore`] resolves a [`TileReference`] to a file under its data
//! directory and opens it. Existence is checked on every call; nothing is
//! cached, and every opened tile is owned by the caller.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, TerrainError};
use crate::raster::RasterTile;
use crate::tile_index::{parse_tile_name, TileReference};

/// File extensions probed for a tile, in lookup order.
pub const TILE_EXTENSIONS: [&str; 3] = ["tif", "tiff", "hgt"];

/// A directory of one-degree DEM tiles.
#[derive(Debug, Clone)]
pub struct TileStore {
    data_dir: PathBuf,
}

impl TileStore {
    /// Create a store over `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Find the file backing `reference`, if one exists.
    ///
    /// Probes `{stem}.{ext}` for every stem of
    /// [`TileReference::file_stems`] and every extension of
    /// [`TILE_EXTENSIONS`]; the canonical stem wins over the compact one.
    pub fn tile_path(&self, reference: TileReference) -> Option<PathBuf> {
        reference
            .file_stems()
            .iter()
            .flat_map(|stem| {
                TILE_EXTENSIONS
                    .iter()
                    .map(move |ext| self.data_dir.join(format!("{stem}.{ext}")))
            })
            .find(|path| path.is_file())
    }

    /// Open the tile for `reference`.
    ///
    /// # Errors
    ///
    /// - [`TerrainError::TileNotFound`] if no file exists for the tile
    /// - [`TerrainError::MalformedRaster`] if the file exists but cannot be decoded
    pub fn open(&self, reference: TileReference) -> Result<RasterTile> {
        let path = self
            .tile_path(reference)
            .ok_or_else(|| TerrainError::TileNotFound {
                reference: reference.name(),
                dir: self.data_dir.clone(),
            })?;

        tracing::debug!(tile = %reference, path = %path.display(), "Opening local tile");

        if has_extension(&path, "hgt") {
            RasterTile::open_hgt(&path, reference)
        } else {
            RasterTile::open(&path)
        }
    }

    /// Open a tile by file name relative to the data directory.
    ///
    /// Used for tiles that don't follow the naming convention.
    pub fn open_file(&self, filename: &str) -> Result<RasterTile> {
        let path = self.data_dir.join(filename);
        if !path.is_file() {
            return Err(TerrainError::TileNotFound {
                reference: filename.to_string(),
                dir: self.data_dir.clone(),
            });
        }

        RasterTile::open(&path)
    }

    /// Scan the data directory for tile files.
    ///
    /// Returns a sorted list of file names with a recognised extension whose
    /// stem parses as a tile name, each paired with its reference.
    pub fn scan_tiles(&self) -> Vec<(String, TileReference)> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let names: BTreeSet<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| {
                TILE_EXTENSIONS
                    .iter()
                    .any(|ext| has_extension(Path::new(name), ext))
            })
            .collect();

        names
            .into_iter()
            .filter_map(|name| parse_tile_name(&name).map(|reference| (name, reference)))
            .collect()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
