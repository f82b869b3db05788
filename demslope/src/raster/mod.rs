//! Raster tile access.
//!
//! This module provides [`RasterTile`], an opened DEM tile exposing its
//! georeferencing transform, optional no-data sentinel, and boundless
//! windowed reads.
//!
//! Two containers are supported:
//!
//! - [`geotiff`]: single-band GeoTIFF files (`.tif`, `.tiff`)
//! - [`hgt`]: SRTM `.hgt` files, memory-mapped
//!
//! A tile is opened, queried, and dropped within a single resolution call.

pub mod geotiff;
pub mod hgt;

use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::coord::Coordinate;
use crate::error::{Result, TerrainError};
use crate::tile_index::TileReference;
use crate::transform::GeoTransform;

/// Backing storage for tile samples, row-major (row 0 = top of the raster).
#[derive(Debug)]
pub(crate) enum Samples {
    /// Decoded samples whose band type fits in `f32` without loss.
    Float32(Vec<f32>),
    /// Decoded `f64` samples, or integer samples too wide for `f32`.
    Float64(Vec<f64>),
    /// Memory-mapped big-endian `i16` samples.
    BigEndianI16(Mmap),
}

impl Samples {
    fn get(&self, index: usize) -> f64 {
        match self {
            Samples::Float32(data) => data[index] as f64,
            Samples::Float64(data) => data[index],
            Samples::BigEndianI16(data) => {
                let offset = index * 2;
                i16::from_be_bytes([data[offset], data[offset + 1]]) as f64
            }
        }
    }

    /// Compare a sample against the sentinel in the band's own precision.
    fn is_nodata(&self, value: f64, nodata: f64) -> bool {
        match self {
            Samples::Float32(_) => value == nodata as f32 as f64,
            Samples::Float64(_) | Samples::BigEndianI16(_) => value == nodata,
        }
    }
}

/// An opened DEM tile.
///
/// # Example
///
/// ```ignore
/// use demslope::{Coordinate, RasterTile};
///
/// let tile = RasterTile::open("/data/dem/N22E078.tif")?;
/// let coordinate = Coordinate::new(22.7, 78.3);
/// let (row, col) = tile.pixel_index(coordinate)?;
/// let window = tile.read_window(row, col, 1);
/// println!("{} missing samples", window.missing_count());
/// ```
#[derive(Debug)]
pub struct RasterTile {
    path: PathBuf,
    transform: GeoTransform,
    nodata: Option<f64>,
    width: usize,
    height: usize,
    samples: Samples,
}

impl RasterTile {
    /// Open a tile, choosing the container from the file extension.
    ///
    /// `.hgt` files are read as SRTM tiles; anything else is decoded as GeoTIFF.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_hgt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("hgt"));

        if is_hgt {
            let reference = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(crate::tile_index::parse_tile_name)
                .ok_or_else(|| {
                    TerrainError::malformed(path, "cannot derive tile anchors from .hgt file name")
                })?;
            hgt::open(path, reference)
        } else {
            geotiff::open(path)
        }
    }

    /// Open an `.hgt` tile with explicit anchors.
    ///
    /// This is useful when the filename doesn't follow the standard naming convention.
    pub fn open_hgt<P: AsRef<Path>>(path: P, reference: TileReference) -> Result<Self> {
        hgt::open(path.as_ref(), reference)
    }

    /// Build a tile from in-memory samples in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MalformedRaster`] if `data.len() != width * height`.
    pub fn from_samples(
        transform: GeoTransform,
        width: usize,
        height: usize,
        data: Vec<f32>,
        nodata: Option<f64>,
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(TerrainError::malformed(
                "<memory>",
                format!("{} samples for a {}x{} grid", data.len(), width, height),
            ));
        }

        Ok(Self::from_parts(
            PathBuf::from("<memory>"),
            transform,
            width,
            height,
            Samples::Float32(data),
            nodata,
        ))
    }

    pub(crate) fn from_parts(
        path: PathBuf,
        transform: GeoTransform,
        width: usize,
        height: usize,
        samples: Samples,
        nodata: Option<f64>,
    ) -> Self {
        Self {
            path,
            transform,
            nodata,
            width,
            height,
            samples,
        }
    }

    /// Map a coordinate to the `(row, col)` of the pixel containing it.
    ///
    /// Inverts the affine transform (rotation terms included) and floors the
    /// result. The index may lie outside the raster extent.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MalformedRaster`] if the transform is singular.
    pub fn pixel_index(&self, coordinate: Coordinate) -> Result<(isize, isize)> {
        let (col, row) = self
            .transform
            .invert(coordinate.longitude, coordinate.latitude)
            .ok_or_else(|| TerrainError::malformed(&self.path, "singular affine transform"))?;

        let (row, col) = (row.floor(), col.floor());
        if !row.is_finite() || !col.is_finite() {
            return Err(TerrainError::malformed(
                &self.path,
                "non-finite pixel index from affine transform",
            ));
        }

        Ok((row as isize, col as isize))
    }

    /// Read the `(2·radius+1)²` window centred at `(row, col)`.
    ///
    /// Pixels outside the raster extent, pixels equal to the no-data sentinel,
    /// and NaN samples are returned as missing.
    pub fn read_window(&self, row: isize, col: isize, radius: usize) -> Neighborhood {
        let r = radius as isize;
        let mut cells = Vec::with_capacity((2 * radius + 1).pow(2));

        for dr in -r..=r {
            for dc in -r..=r {
                cells.push(self.sample_at(row + dr, col + dc));
            }
        }

        Neighborhood { radius, cells }
    }

    fn sample_at(&self, row: isize, col: isize) -> Option<f64> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }

        let value = self.samples.get(row * self.width + col);
        let is_nodata = self
            .nodata
            .is_some_and(|nodata| self.samples.is_nodata(value, nodata));
        if value.is_nan() || is_nodata {
            None
        } else {
            Some(value)
        }
    }

    /// The georeferencing transform.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// The no-data sentinel, if the tile declares one.
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Dimensions as `(width, height)` in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Path the tile was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Geographic envelope as `(min_lon, min_lat, max_lon, max_lat)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.width, self.height)
    }

    /// Centre of the geographic envelope.
    pub fn center(&self) -> Coordinate {
        let (min_lon, min_lat, max_lon, max_lat) = self.bounds();
        Coordinate::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0)
    }

    /// Container name, for display.
    pub fn format(&self) -> &'static str {
        match self.samples {
            Samples::Float32(_) | Samples::Float64(_) => "GeoTIFF",
            Samples::BigEndianI16(_) => "SRTM .hgt",
        }
    }

    /// Scan every sample for the value range and missing count.
    pub fn statistics(&self) -> TileStatistics {
        let mut stats = TileStatistics {
            min: None,
            max: None,
            missing: 0,
            total: self.width * self.height,
        };

        for row in 0..self.height as isize {
            for col in 0..self.width as isize {
                match self.sample_at(row, col) {
                    Some(v) => {
                        stats.min = Some(stats.min.map_or(v, |m: f64| m.min(v)));
                        stats.max = Some(stats.max.map_or(v, |m: f64| m.max(v)));
                    }
                    None => stats.missing += 1,
                }
            }
        }
        stats
    }
}

/// Summary of a tile's samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStatistics {
    /// Lowest valid sample, `None` if every sample is missing.
    pub min: Option<f64>,
    /// Highest valid sample.
    pub max: Option<f64>,
    /// Number of no-data samples.
    pub missing: usize,
    /// Total number of samples.
    pub total: usize,
}

/// A square window of samples read around a pixel.
///
/// Cells are stored row-major; `None` marks a missing sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    radius: usize,
    cells: Vec<Option<f64>>,
}

impl Neighborhood {
    /// Build a window from row-major cells.
    ///
    /// Returns `None` unless `cells.len() == (2·radius+1)²`.
    pub fn from_cells(radius: usize, cells: Vec<Option<f64>>) -> Option<Self> {
        (cells.len() == (2 * radius + 1).pow(2)).then_some(Self { radius, cells })
    }

    /// Window radius.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Side length, `2·radius+1`.
    pub fn size(&self) -> usize {
        2 * self.radius + 1
    }

    /// Cell at window-relative `(row, col)`, both in `0..size()`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.size() + col]
    }

    /// The centre cell.
    pub fn center(&self) -> Option<f64> {
        self.get(self.radius, self.radius)
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a window has at least its centre cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
