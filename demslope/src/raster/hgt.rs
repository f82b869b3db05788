//! SRTM `.hgt` tile support.
//!
//! SRTM files contain elevation data in a simple binary format:
//!
//! - **SRTM1**: 3601×3601 samples, 1 arc-second (~30m) resolution
//! - **SRTM3**: 1201×1201 samples, 3 arc-second (~90m) resolution
//!
//! Each sample is a 16-bit big-endian signed integer; -32768 marks a void.
//! The format carries no georeferencing: samples sit on a grid whose outer
//! rows and columns lie exactly on the tile's integer-degree edges, so the
//! transform is implied by the tile anchors.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use super::{RasterTile, Samples};
use crate::error::{Result, TerrainError};
use crate::tile_index::TileReference;
use crate::transform::GeoTransform;

/// File size for SRTM1 (1 arc-second, ~30m resolution): 3601 × 3601 × 2 bytes
const SRTM1_SIZE: usize = SRTM1_SAMPLES * SRTM1_SAMPLES * 2;

/// File size for SRTM3 (3 arc-second, ~90m resolution): 1201 × 1201 × 2 bytes
const SRTM3_SIZE: usize = SRTM3_SAMPLES * SRTM3_SAMPLES * 2;

/// Number of samples per row/column for SRTM1
const SRTM1_SAMPLES: usize = 3601;

/// Number of samples per row/column for SRTM3
const SRTM3_SAMPLES: usize = 1201;

/// Value indicating no data (void) in SRTM files
pub const VOID_VALUE: i16 = -32768;

/// Open a memory-mapped `.hgt` tile anchored at `reference`.
///
/// The resolution (SRTM1 vs SRTM3) is detected from the file size.
///
/// # Errors
///
/// Returns [`TerrainError::MalformedRaster`] if the file size doesn't match
/// SRTM1 or SRTM3.
pub fn open(path: &Path, reference: TileReference) -> Result<RasterTile> {
    let file = File::open(path)?;

    // SAFETY: Memory mapping is safe as long as the file is not modified
    // while mapped. We open the file read-only and don't expose the mapping.
    let mmap = unsafe { Mmap::map(&file)? };

    let samples = match mmap.len() {
        SRTM1_SIZE => SRTM1_SAMPLES,
        SRTM3_SIZE => SRTM3_SAMPLES,
        size => {
            return Err(TerrainError::malformed(
                path,
                format!(
                    "invalid file size: {} bytes (expected {} for SRTM1 or {} for SRTM3)",
                    size, SRTM1_SIZE, SRTM3_SIZE
                ),
            ))
        }
    };

    Ok(RasterTile::from_parts(
        path.to_path_buf(),
        implied_transform(reference, samples),
        samples,
        samples,
        Samples::BigEndianI16(mmap),
        Some(VOID_VALUE as f64),
    ))
}

/// Transform of an `n × n` SRTM grid anchored at `reference`.
///
/// Row 0 is the north edge; sample centres sit on `1/(n-1)` degree spacing,
/// so pixel corners are offset by half a sample.
pub fn implied_transform(reference: TileReference, samples: usize) -> GeoTransform {
    let res = 1.0 / (samples - 1) as f64;
    GeoTransform::north_up(
        reference.lon() as f64 - res / 2.0,
        (reference.lat() + 1) as f64 + res / 2.0,
        res,
        res,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::test_support::write_hgt;
    use tempfile::TempDir;

    #[test]
    fn test_open_srtm3() {
        let dir = TempDir::new().unwrap();
        let path = write_hgt(dir.path(), "N35E138.hgt", |row, col| {
            if (row, col) == (600, 600) {
                500
            } else {
                0
            }
        });

        let tile = open(&path, TileReference::new(35, 138)).unwrap();
        assert_eq!(tile.dimensions(), (1201, 1201));
        assert_eq!(tile.nodata(), Some(-32768.0));

        // Center of tile -> row 600, col 600
        let (row, col) = tile.pixel_index(Coordinate::new(35.5, 138.5)).unwrap();
        assert_eq!((row, col), (600, 600));
        assert_eq!(tile.read_window(row, col, 0).center(), Some(500.0));
    }

    #[test]
    fn test_corners_map_to_edge_samples() {
        let dir = TempDir::new().unwrap();
        let path = write_hgt(dir.path(), "N35E138.hgt", |row, col| (row + col) as i16);
        let tile = open(&path, TileReference::new(35, 138)).unwrap();

        // Northwest corner
        let (row, col) = tile.pixel_index(Coordinate::new(35.9999, 138.0001)).unwrap();
        assert_eq!((row, col), (0, 0));

        // Southeast corner
        let (row, col) = tile.pixel_index(Coordinate::new(35.0001, 138.9999)).unwrap();
        assert_eq!((row, col), (1200, 1200));
        assert_eq!(tile.read_window(row, col, 0).center(), Some(2400.0));
    }

    #[test]
    fn test_void_is_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_hgt(dir.path(), "N35E138.hgt", |_, _| VOID_VALUE);
        let tile = open(&path, TileReference::new(35, 138)).unwrap();

        assert_eq!(tile.read_window(600, 600, 1).missing_count(), 9);
    }

    #[test]
    fn test_invalid_file_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("N35E138.hgt");
        std::fs::write(&path, vec![0u8; 1000]).unwrap();

        let err = open(&path, TileReference::new(35, 138)).unwrap_err();
        match err {
            TerrainError::MalformedRaster { reason, .. } => assert!(reason.contains("1000")),
            other => panic!("Expected MalformedRaster, got {other:?}"),
        }
    }

    #[test]
    fn test_implied_transform_bounds() {
        let gt = implied_transform(TileReference::new(-13, -78), 1201);
        let (min_x, min_y, max_x, max_y) = gt.bounds(1201, 1201);
        let half = 0.5 / 1200.0;

        assert!((min_x - (-78.0 - half)).abs() < 1e-9);
        assert!((max_x - (-77.0 + half)).abs() < 1e-9);
        assert!((min_y - (-13.0 - half)).abs() < 1e-9);
        assert!((max_y - (-12.0 + half)).abs() < 1e-9);
    }
}
