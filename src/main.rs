//! CLI entry point for the bike traffic tool.
//!
//! Loads a station list and a trip history, indexes trips by minute of day,
//! and reports per-station arrivals and departures for a time window.

use anyhow::{Context, Result, anyhow};
use bike_traffic::{
    TimeFilter, TripBuckets, compute_station_traffic,
    fetch::{BasicClient, load_source},
    model::{Station, StationTraffic},
    output::{print_json, print_pretty, write_csv, write_json},
    parser::{parse_stations, parse_trips},
    summary::{TrafficSummary, busiest},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bike_traffic")]
#[command(about = "Bike-share station traffic by time of day", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Sources {
    /// Station list (GBFS JSON), as a path or URL [env: BIKE_STATIONS_URL]
    #[arg(short, long)]
    stations: Option<String>,

    /// Trip history CSV, optionally gzipped, as a path or URL [env: BIKE_TRIPS_URL]
    #[arg(short, long)]
    trips: Option<String>,

    /// Minute of day (0-1439), HH:MM, or "any"/-1 for all trips
    #[arg(long, default_value = "any", allow_hyphen_values = true)]
    time: TimeFilter,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute traffic for every station and write it to a file
    Traffic {
        #[command(flatten)]
        sources: Sources,

        /// File to write annotated stations to
        #[arg(short, long, default_value = "traffic.csv")]
        output: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Show the busiest stations for a time window
    Busiest {
        #[command(flatten)]
        sources: Sources,

        /// Number of stations to show
        #[arg(short, long, default_value_t = 10)]
        n: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bike_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bike_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Traffic {
            sources,
            output,
            format,
        } => {
            let rows = load_traffic(&sources).await?;
            let summary = TrafficSummary::from_traffic(sources.time, &rows);
            print_json(&summary)?;

            match format {
                Format::Csv => write_csv(&output, &rows)?,
                Format::Json => write_json(&output, &rows)?,
            }
            info!(output = %output, stations = rows.len(), "Station traffic written");
        }
        Commands::Busiest { sources, n } => {
            let rows = load_traffic(&sources).await?;
            print_pretty(&TrafficSummary::from_traffic(sources.time, &rows));

            for (rank, row) in busiest(&rows, n).into_iter().enumerate() {
                info!(
                    rank = rank + 1,
                    station_id = %row.id,
                    station_name = %row.name,
                    total = row.total_traffic,
                    departures = row.departures,
                    arrivals = row.arrivals,
                    flow = ?row.flow(),
                    "Station"
                );
            }
        }
    }

    Ok(())
}

/// Resolves a source from its flag, falling back to an environment variable.
fn resolve_source(flag: Option<&str>, env_var: &str) -> Result<String> {
    match flag {
        Some(source) => Ok(source.to_string()),
        None => std::env::var(env_var)
            .map_err(|_| anyhow!("no source given and {env_var} is not set")),
    }
}

/// Loads both datasets concurrently, indexes the trips, and aggregates for the requested window.
#[tracing::instrument(skip(sources), fields(time = %sources.time))]
async fn load_traffic(sources: &Sources) -> Result<Vec<StationTraffic>> {
    let stations_src = resolve_source(sources.stations.as_deref(), "BIKE_STATIONS_URL")?;
    let trips_src = resolve_source(sources.trips.as_deref(), "BIKE_TRIPS_URL")?;

    let client = BasicClient::new();
    let (station_bytes, trip_bytes) = tokio::try_join!(
        load_source(&client, &stations_src),
        load_source(&client, &trips_src),
    )?;

    let stations: Vec<Station> = parse_stations(&station_bytes)
        .with_context(|| format!("failed to load stations from {stations_src}"))?;
    let trips = parse_trips(&trip_bytes)
        .with_context(|| format!("failed to load trips from {trips_src}"))?;
    info!(stations = stations.len(), trips = trips.len(), "Datasets loaded");

    let buckets = TripBuckets::from_trips(trips);
    Ok(compute_station_traffic(&stations, &buckets, sources.time))
}
