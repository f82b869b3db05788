use anyhow::{bail, Context, Result};
use demslope::tile_index::parse_tile_name;
use demslope::{locate, Coordinate, RasterTile};
use std::path::PathBuf;

use super::{format_size, ResolverOptions};

pub fn run(
    options: &ResolverOptions,
    tile: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<()> {
    let tile = open_tile(options, tile, lat, lon)?;

    let file_size = std::fs::metadata(tile.path()).map(|m| m.len()).ok();
    let (width, height) = tile.dimensions();
    let (min_lon, min_lat, max_lon, max_lat) = tile.bounds();
    let gt = tile.transform();
    let stats = tile.statistics();

    // Display information
    println!("Tile: {}", tile.path().file_name().unwrap_or_default().to_string_lossy());
    println!("Path: {}", tile.path().display());
    println!();
    println!("Format: {} ({}x{} samples)", tile.format(), width, height);
    println!(
        "Transform: a={} b={} c={} d={} e={} f={}",
        gt.a, gt.b, gt.c, gt.d, gt.e, gt.f
    );
    println!(
        "Bounds: lon {:.6} to {:.6}, lat {:.6} to {:.6}",
        min_lon, max_lon, min_lat, max_lat
    );
    match tile.nodata() {
        Some(nodata) => println!("No-data value: {}", nodata),
        None => println!("No-data value: none"),
    }
    if let Some(size) = file_size {
        println!("File size: {}", format_size(size));
    }
    println!();

    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        println!("Min elevation: {}m", min);
        println!("Max elevation: {}m", max);
    }
    if stats.missing > 0 {
        let pct = (stats.missing as f64 / stats.total as f64) * 100.0;
        println!("Missing samples: {} ({:.1}%)", stats.missing, pct);
    }

    Ok(())
}

/// Open the tile named on the command line.
///
/// Accepts a coordinate, a path to an existing file, a tile name
/// (`N22E078`), or a file name inside the data directory.
fn open_tile(
    options: &ResolverOptions,
    tile: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<RasterTile> {
    if let (Some(lat), Some(lon)) = (lat, lon) {
        let reference = locate(Coordinate::new(lat, lon));
        return options
            .store()?
            .open(reference)
            .with_context(|| format!("Failed to open tile {}", reference));
    }

    let Some(tile) = tile else {
        bail!("Specify a tile name or --lat and --lon");
    };

    let path = PathBuf::from(&tile);
    if path.is_file() {
        return RasterTile::open(&path).context("Failed to load tile");
    }

    let store = options.store()?;
    match parse_tile_name(&tile) {
        Some(reference) if !tile.contains('.') => store
            .open(reference)
            .with_context(|| format!("Failed to open tile {}", reference)),
        _ => store
            .open_file(&tile)
            .with_context(|| format!("Failed to open tile {}", tile)),
    }
}
