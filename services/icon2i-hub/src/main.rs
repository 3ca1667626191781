//! ICON-2I hub.
//!
//! Ingests ICON-2I forecast runs into date partitions and retrieves
//! spatio-temporal windows as multiband GeoTIFFs, from the command line or
//! through the HTTP job adapter.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use icon_common::HubError;
use icon2i_hub::{start_server, HubConfig, ServerState};
use pipeline::{Icon2iHub, IngestRequest, OneOrMany, RetrieveRequest};

#[derive(Parser, Debug)]
#[command(name = "icon2i-hub")]
#[command(about = "ICON-2I forecast ingestion and retrieval")]
struct Cli {
    /// Configuration file path (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Human readable logs instead of JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest forecast runs into date partitions
    Ingest(IngestArgs),
    /// Retrieve a window as one raster per variable
    Retrieve(RetrieveArgs),
    /// Serve the HTTP job adapter
    Serve {
        /// Port (defaults to the configured one)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// Variable code, repeatable (default: all)
    #[arg(long = "variable")]
    variables: Vec<String>,

    /// Forecast run timestamp, repeatable (default: every published run)
    #[arg(long = "forecast-run")]
    forecast_runs: Vec<String>,

    /// Directory receiving the partition files
    #[arg(long)]
    out_dir: Option<String>,

    /// s3:// location receiving the partitions
    #[arg(long)]
    bucket_destination: Option<String>,
}

#[derive(Args, Debug)]
struct RetrieveArgs {
    /// Variable code, repeatable (default: all)
    #[arg(long = "variable")]
    variables: Vec<String>,

    /// Window start (ISO-8601)
    #[arg(long)]
    time_start: String,

    /// Window end (ISO-8601, default: one hour after the start)
    #[arg(long)]
    time_end: Option<String>,

    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    lat_range: Option<Vec<f64>>,

    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    long_range: Option<Vec<f64>>,

    #[arg(long)]
    out_format: Option<String>,

    /// s3:// location holding existing partitions
    #[arg(long)]
    bucket_source: Option<String>,

    /// s3:// location receiving the rasters
    #[arg(long)]
    bucket_destination: Option<String>,

    /// Raster path ending in .tif
    #[arg(long)]
    out: Option<String>,
}

fn non_empty(values: Vec<String>) -> Option<OneOrMany<String>> {
    if values.is_empty() {
        None
    } else {
        Some(OneOrMany::Many(values))
    }
}

impl From<IngestArgs> for IngestRequest {
    fn from(args: IngestArgs) -> Self {
        IngestRequest {
            variable: non_empty(args.variables),
            forecast_run: non_empty(args.forecast_runs),
            out_dir: args.out_dir,
            bucket_destination: args.bucket_destination,
        }
    }
}

impl From<RetrieveArgs> for RetrieveRequest {
    fn from(args: RetrieveArgs) -> Self {
        let mut time_range = vec![args.time_start];
        time_range.extend(args.time_end);
        RetrieveRequest {
            variable: non_empty(args.variables),
            lat_range: args.lat_range.map(OneOrMany::Many),
            long_range: args.long_range.map(OneOrMany::Many),
            time_range: Some(OneOrMany::Many(time_range)),
            out_format: args.out_format,
            bucket_source: args.bucket_source,
            bucket_destination: args.bucket_destination,
            out: args.out,
        }
    }
}

fn init_tracing(log_level: &str, pretty: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the run output
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if pretty {
        tracing::subscriber::set_global_default(builder.finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    }
    Ok(())
}

/// Print the run output, or the error body and exit non-zero.
fn report<T: Serialize>(result: std::result::Result<T, HubError>) -> Result<()> {
    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err.to_json())?);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.pretty)?;

    let config = HubConfig::load(cli.config.as_deref())?;
    let hub = Icon2iHub::new(config.pipeline.clone())
        .with_context(|| "Failed to set up the ICON-2I hub")?;

    match cli.command {
        Command::Ingest(args) => {
            info!("Running ingestion");
            report(hub.ingest(&args.into(), Utc::now()).await)
        }
        Command::Retrieve(args) => {
            info!("Running retrieval");
            report(hub.retrieve(&args.into(), Utc::now()).await)
        }
        Command::Serve { port } => {
            if config.token.is_none() {
                tracing::warn!("No ICON2I_TOKEN configured, every job will be denied");
            }
            let state = Arc::new(ServerState::new(hub, config.token.clone()));
            start_server(state, port.unwrap_or(config.port)).await
        }
    }
}
