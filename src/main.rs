//! # Insight Harvester
//!
//! Fetches the published insights (articles, alerts, newsletters) of
//! accounting and advisory firms, paginating each listing only as far back as
//! requested, and writes one normalized JSON file per firm.
//!
//! ## Features
//!
//! - Thirteen firm listings: rendered pages (show-more buttons, numbered
//!   pages, infinite scroll) and JSON search APIs
//! - Fetch horizons: the newest batch, everything, or a rolling N-month window
//! - Records deduplicated by link and sorted newest first
//! - A process-wide cap on open rendering sessions, with launch jitter
//! - Optional cookie file for authenticated sessions
//!
//! ## Usage
//!
//! ```sh
//! insight_harvester -j ./json -f 6m
//! insight_harvester --list
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags over YAML over defaults
//! 2. **Fetching**: each source runs through the fetch orchestrator (several
//!    sources at once, sessions bounded by the concurrency gate)
//! 3. **Retry**: a failed source is retried as a whole, then skipped
//! 4. **Output**: `{json_output_dir}/{date}/{source}.json`

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod gate;
mod horizon;
mod models;
mod normalize;
mod orchestrator;
mod outputs;
mod pagination;
mod retry;
mod session;
mod sources;
#[cfg(test)]
mod testing;
mod utils;

use cli::Cli;
use config::AppConfig;
use error::ScrapeError;
use gate::ConcurrencyGate;
use horizon::FetchHorizon;
use orchestrator::FetchOrchestrator;
use outputs::json;
use session::HttpSessionProvider;
use sources::Source;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();

    let args = Cli::parse();
    debug!(?args.sources, %args.fetch, ?args.json_output_dir, "Parsed CLI arguments");

    if args.list {
        for name in sources::names() {
            println!("{name}");
        }
        return Ok(());
    }

    info!("insight_harvester starting up");

    let config = match &args.config {
        Some(path) => AppConfig::load(path).await?,
        None => AppConfig::default(),
    }
    .apply_cli(&args);

    // Early check: ensure JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let horizon = args.horizon();
    if let FetchHorizon::Unrecognized(raw) = &horizon {
        warn!(fetch = %raw, "Unrecognized fetch horizon; fetching the first batch only");
    }

    let selected = select_sources(&args)?;
    info!(count = selected.len(), %horizon, "Sources selected");

    let provider = HttpSessionProvider::new(&config.session_config()).await?;
    let gate = ConcurrencyGate::new(config.max_concurrent).with_launch_jitter(config.launch_jitter());
    let orchestrator = FetchOrchestrator::new(provider, gate, config.orchestrator_settings());
    let retry = config.retry_policy();

    // ---- Fetch sources concurrently ----
    let results: Vec<(&'static str, Option<usize>)> = stream::iter(selected.iter())
        .map(|source| {
            let orchestrator = &orchestrator;
            let retry = &retry;
            let horizon = &horizon;
            let json_output_dir = args.json_output_dir.as_str();
            async move {
                let fetched = retry
                    .run(source.name, || orchestrator.execute(source, horizon))
                    .await;
                let Some(records) = fetched else {
                    error!(source = source.name, "Source failed; no output written");
                    return (source.name, None);
                };
                match json::write_result_set(&records, source.name, json_output_dir).await {
                    Ok(_) => (source.name, Some(records.len())),
                    Err(e) => {
                        error!(source = source.name, error = %e, "Failed to write JSON");
                        (source.name, None)
                    }
                }
            }
        })
        .buffer_unordered(config.parallel_sources.max(1))
        .collect()
        .await;

    let mut total = 0usize;
    let mut failed = 0usize;
    for &(name, outcome) in &results {
        match outcome {
            Some(count) => {
                total += count;
                info!(source = name, count, "Source summary");
            }
            None => {
                failed += 1;
                warn!(source = name, "Source summary: failed");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        sources = results.len(),
        failed,
        records = total,
        elapsed_secs = elapsed.as_secs_f64(),
        "Run complete"
    );

    Ok(())
}

/// Build the sources named on the command line (all of them by default),
/// applying a `--url` override when one was given.
fn select_sources(args: &Cli) -> Result<Vec<Source>, ScrapeError> {
    let names: Vec<String> = if args.sources.is_empty() {
        sources::names().into_iter().map(str::to_string).collect()
    } else {
        args.sources.clone()
    };

    if args.url.is_some() && names.len() != 1 {
        return Err(ScrapeError::Config(
            "--url needs exactly one --source".to_string(),
        ));
    }

    names
        .iter()
        .map(|name| {
            let source = sources::by_name(name).ok_or_else(|| {
                ScrapeError::Config(format!(
                    "unknown source `{name}` (known: {})",
                    sources::names().join(", ")
                ))
            })??;
            Ok(match &args.url {
                Some(url) => source.with_urls(vec![url.clone()]),
                None => source,
            })
        })
        .collect()
}
