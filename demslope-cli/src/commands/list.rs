use anyhow::Result;
use demslope::TileReference;
use std::fs;
use std::path::Path;

use super::{format_size, ResolverOptions};

// Detect SRTM resolution from file size
const SRTM1_SIZE: u64 = 3601 * 3601 * 2;
const SRTM3_SIZE: u64 = 1201 * 1201 * 2;

pub fn run(options: &ResolverOptions) -> Result<()> {
    let store = options.store()?;
    let dir = store.data_dir();

    if !dir.exists() {
        anyhow::bail!("Data directory does not exist: {}", dir.display());
    }

    let tiles = store.scan_tiles();
    if tiles.is_empty() {
        println!("No tiles found in: {}", dir.display());
        return Ok(());
    }

    let mut total_size: u64 = 0;

    println!("{:<24} {:>8} {:>28}", "TILE", "TYPE", "COVERAGE");
    println!("{}", "-".repeat(62));

    for (filename, reference) in &tiles {
        let size = fs::metadata(dir.join(filename))
            .map(|m| m.len())
            .unwrap_or(0);
        total_size += size;

        println!(
            "{:<24} {:>8} {:>28}",
            filename,
            tile_kind(Path::new(filename), size),
            coverage(*reference)
        );
    }

    // Summary
    println!();
    println!("Summary:");
    println!("  Total tiles: {}", tiles.len());
    println!("  Total size: {}", format_size(total_size));
    println!("  Data directory: {}", dir.display());

    Ok(())
}

fn tile_kind(path: &Path, size: u64) -> &'static str {
    let is_hgt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("hgt"));

    match (is_hgt, size) {
        (true, SRTM1_SIZE) => "SRTM1",
        (true, SRTM3_SIZE) => "SRTM3",
        (true, _) => "???",
        (false, _) => "GeoTIFF",
    }
}

fn coverage(reference: TileReference) -> String {
    let (lat, lon) = (reference.lat(), reference.lon());
    let lat_prefix = |v: i32| if v >= 0 { "N" } else { "S" };
    let lon_prefix = |v: i32| if v >= 0 { "E" } else { "W" };
    format!(
        "{}{:02} to {}{:02}, {}{:03} to {}{:03}",
        lat_prefix(lat),
        lat.abs(),
        lat_prefix(lat + 1),
        (lat + 1).abs(),
        lon_prefix(lon),
        lon.abs(),
        lon_prefix(lon + 1),
        (lon + 1).abs()
    )
}
