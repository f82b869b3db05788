use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{ResolverOptions, SlopeSource};

/// Terrain elevation and slope CLI tool
#[derive(Parser)]
#[command(name = "demslope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing DEM tiles
    #[arg(short, long, env = "DEMSLOPE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Slope strategy
    #[arg(
        long,
        env = "DEMSLOPE_SLOPE_SOURCE",
        value_enum,
        ignore_case = true,
        default_value = "table",
        global = true
    )]
    slope_source: SlopeSource,

    /// JSON slope table (replaces the built-in table)
    #[arg(long, env = "DEMSLOPE_SLOPE_TABLE", global = true)]
    slope_table: Option<PathBuf>,

    /// JSON site registry (replaces the built-in sites)
    #[arg(long, env = "DEMSLOPE_SITES", global = true)]
    sites: Option<PathBuf>,

    /// Remote point-elevation endpoint used when no local tile exists
    #[arg(
        long,
        env = "DEMSLOPE_REMOTE_URL",
        default_value = demslope::remote::DEFAULT_REMOTE_URL,
        global = true
    )]
    remote_url: String,

    /// Disable the remote elevation fallback
    #[arg(long, global = true)]
    offline: bool,

    /// Remote request timeout in seconds
    #[arg(
        long,
        env = "DEMSLOPE_REMOTE_TIMEOUT_SECS",
        default_value_t = demslope::remote::DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    timeout_secs: u64,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation and slope for a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Query elevation and slope for a named site
    Site {
        /// Site name (case-insensitive)
        name: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Process elevation and slope for multiple coordinates from a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to `<input>_terrain.csv`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,
    },

    /// Display information about a DEM tile
    Info {
        /// Path to a tile file, or tile name (e.g., N22E078)
        #[arg(required_unless_present_all = ["lat", "lon"])]
        tile: Option<String>,

        /// Specify tile by latitude instead of filename
        #[arg(long, requires = "lon", conflicts_with = "tile", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Specify tile by longitude instead of filename
        #[arg(long, requires = "lat", conflicts_with = "tile", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List available DEM tiles
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "demslope=debug".into()),
            )
            .init();
    }

    let options = ResolverOptions {
        data_dir: cli.data_dir,
        slope_source: cli.slope_source,
        slope_table: cli.slope_table,
        sites: cli.sites,
        remote_url: cli.remote_url,
        offline: cli.offline,
        timeout_secs: cli.timeout_secs,
    };

    match cli.command {
        Commands::Query { lat, lon, json } => commands::query::run(&options, lat, lon, json),
        Commands::Site { name, json } => commands::site::run(&options, &name, json),
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
        } => commands::batch::run(&options, input, output, lat_col, lon_col),
        Commands::Info { tile, lat, lon } => commands::info::run(&options, tile, lat, lon),
        Commands::List => commands::list::run(&options),
    }
}
