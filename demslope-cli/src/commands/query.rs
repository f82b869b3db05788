use anyhow::{Context, Result};
use demslope::Coordinate;

use super::{format_value, ResolverOptions};

pub fn run(options: &ResolverOptions, lat: f64, lon: f64, json: bool) -> Result<()> {
    let resolver = options.resolver()?;

    let report = resolver
        .resolve(Coordinate::new(lat, lon))
        .context("Failed to resolve terrain")?
        .into_report();

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("Elevation: {}", format_value(report.elevation_m, " m"));
        println!("Slope: {}", format_value(report.slope_deg, "°"));
    }

    Ok(())
}
