use anyhow::{Context, Result};

use super::{format_value, ResolverOptions};

pub fn run(options: &ResolverOptions, name: &str, json: bool) -> Result<()> {
    let resolver = options.resolver()?;

    let report = resolver
        .resolve_site(name)
        .with_context(|| format!("Failed to resolve site '{}'", name))?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("Site: {}", report.name);
        println!("Location: {:.5}, {:.5}", report.latitude, report.longitude);
        println!("Elevation: {}", format_value(report.elevation_m, " m"));
        println!("Slope: {}", format_value(report.slope_deg, "°"));
    }

    Ok(())
}
