use anyhow::{bail, Context, Result};
use demslope::{Coordinate, TerrainResolver};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::ResolverOptions;

pub fn run(
    options: &ResolverOptions,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: String,
    lon_col: String,
) -> Result<()> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "csv" {
        bail!("Unsupported file format: {}. Use .csv", extension);
    }

    let resolver = options.resolver()?;

    let output_path = output.unwrap_or_else(|| default_output_path(&input));
    let input_file = File::open(&input).context("Failed to open input file")?;
    let output_file = File::create(&output_path).context("Failed to create output file")?;

    let rows = process_csv(
        &resolver,
        BufReader::new(input_file),
        BufWriter::new(output_file),
        &lat_col,
        &lon_col,
        true,
    )?;

    println!("{} rows written to: {}", rows, output_path.display());
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_terrain.csv", stem))
}

/// Append `elevation_m` and `slope_deg` columns to every record.
///
/// No-data values are written as empty cells. Returns the number of rows.
fn process_csv<R: Read, W: Write>(
    resolver: &TerrainResolver,
    input: R,
    output: W,
    lat_col: &str,
    lon_col: &str,
    show_progress: bool,
) -> Result<usize> {
    let mut reader = csv::Reader::from_reader(input);

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    // Collect records for progress bar
    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;

    let pb = if show_progress {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut writer = csv::Writer::from_writer(output);

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("elevation_m");
    new_headers.push("slope_deg");
    writer.write_record(&new_headers)?;

    for (line, record) in records.iter().enumerate() {
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude on row {}", line + 1))?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude on row {}", line + 1))?;

        let (elevation, slope) = match resolver.resolve(Coordinate::new(lat, lon)) {
            Ok(resolution) => {
                let report = resolution.into_report();
                (cell(report.elevation_m), cell(report.slope_deg))
            }
            Err(e) => {
                tracing::warn!(lat, lon, error = %e, "Row could not be resolved");
                (String::new(), String::new())
            }
        };

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&elevation);
        new_record.push(&slope);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    Ok(records.len())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}
