//! CLI entry point for the trip emissions tool.
//!
//! Provides subcommands for simulating one or two trips against the
//! emissions backend, building shareable links, and replaying them.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use trip_emissions::{
    chart::stacked_series,
    config::Config,
    fetch::BasicClient,
    infra::backend::EmissionsBackend,
    output::{append_summary, print_json, print_pretty},
    results::TripInputs,
    session::{SubmissionOutcome, TripSession},
    share::{decode_share_link, share_url},
    step::{Step, reindex},
    validation::{TripForm, validate},
};

#[derive(Parser)]
#[command(name = "trip_emissions")]
#[command(about = "Compare the carbon footprint of multi-leg trips", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute emissions for a trip, optionally against a second trip
    Simulate {
        /// JSON file holding the main trip's steps
        #[arg(short, long)]
        trip: String,

        /// JSON file holding a second trip to compare against
        #[arg(short, long)]
        alternative: Option<String>,

        /// CSV file to append per-trip summaries to
        #[arg(short, long)]
        output: Option<String>,

        /// Log the full results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print a shareable link for one or two trips
    Share {
        /// JSON file holding the main trip's steps
        #[arg(short, long)]
        trip: String,

        /// JSON file holding the alternative trip's steps
        #[arg(short, long)]
        alternative: Option<String>,
    },
    /// Decode a shareable link and simulate it when it is complete
    OpenLink {
        #[arg(value_name = "URL")]
        link: String,

        /// CSV file to append per-trip summaries to
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/trip_emissions.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trip_emissions.log"));

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
        Commands::Simulate {
            trip,
            alternative,
            output,
            json,
        } => {
            let inputs = TripInputs {
                main_trip: load_steps(&trip)?,
                alternative_trip: alternative.as_deref().map(load_steps).transpose()?,
            };
            simulate(inputs, output.as_deref(), json).await?;
        }
        Commands::Share { trip, alternative } => {
            let config = Config::from_env()?;
            let main = load_steps(&trip)?;
            let alternative = alternative.as_deref().map(load_steps).transpose()?;

            let url = share_url(&config.share_base_url, &main, alternative.as_deref())?;
            println!("{url}");
        }
        Commands::OpenLink { link, output } => {
            let shared = decode_share_link(&link)?;

            match shared.auto_submission() {
                Some(inputs) => {
                    if shared.alternative.is_some() && inputs.alternative_trip.is_none() {
                        warn!("Alternative trip is incomplete, simulating the main trip only");
                    }
                    simulate(inputs, output.as_deref(), false).await?;
                }
                None => {
                    if let Err(e) = validate(&shared.main, TripForm::First) {
                        warn!(advice = %e.advice_key(), "{e}");
                    }
                    info!("Shared trip is incomplete, nothing submitted");
                }
            }
        }
    }

    Ok(())
}

/// Reads a JSON array of steps and renumbers them by position.
#[tracing::instrument]
fn load_steps(path: &str) -> Result<Vec<Step>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read trip file {path}"))?;
    let mut steps: Vec<Step> =
        serde_json::from_str(&content).with_context(|| format!("Invalid trip file {path}"))?;
    reindex(&mut steps);
    Ok(steps)
}

/// Submits one trip (or a pair) and reports the outcome.
async fn simulate(inputs: TripInputs, output: Option<&str>, json: bool) -> Result<()> {
    let config = Config::from_env()?;
    let client = BasicClient::from_config(&config)?;
    let session = TripSession::new(EmissionsBackend::new(client, config.api_url.clone()));

    match session.submit(inputs).await {
        SubmissionOutcome::Completed(results) => {
            for trip in &results.trips {
                info!(
                    label = %trip.label,
                    main = trip.is_main_trip,
                    steps = trip.steps.len(),
                    total_kg_co2eq = trip.total_emissions,
                    "Trip"
                );
            }

            let chart = stacked_series(&results);
            for series in &chart.series {
                info!(source = %series.source, values = ?series.values, "Emission source");
            }

            if json {
                print_json(&results)?;
            } else {
                print_pretty(&results);
            }
            if let Some(path) = output {
                append_summary(path, &results)?;
                info!(path, "Summary appended");
            }
            Ok(())
        }
        SubmissionOutcome::Invalid(e) => bail!("{e} ({})", e.advice_key()),
        SubmissionOutcome::Failed(e) => bail!("Simulation failed: {e}"),
        SubmissionOutcome::InFlight => bail!("A simulation is already running"),
    }
}
