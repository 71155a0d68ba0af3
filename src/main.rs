//! # Finviz Sentiment
//!
//! Turns saved Finviz quote pages into a per-ticker sentiment trend.
//!
//! ## Usage
//!
//! ```sh
//! finviz_sentiment --fetch AAPL TSLA
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching** (optional): download quote pages into the datasets directory
//! 2. **Loading**: read every saved snapshot as a ticker-keyed document
//! 3. **Pipeline**: extract rows, resolve times, clean and dedupe headlines,
//!    score polarity, bucket by ticker and time
//! 4. **Output**: CSV tables and a chart-ready JSON trend in the results directory

use std::error::Error;

use chrono::Local;
use clap::Parser;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use finviz_sentiment::cli::Cli;
use finviz_sentiment::config::Config;
use finviz_sentiment::outputs::{json, summary, tables};
use finviz_sentiment::pipeline::{self, PipelineOptions};
use finviz_sentiment::pipeline::diagnostics::RunDiagnostics;
use finviz_sentiment::pipeline::sentiment::LexiconScorer;
use finviz_sentiment::scrapers::finviz::{self, FinvizClient};
use finviz_sentiment::utils::{clear_directory, ensure_writable_dir};

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

    let start_time = std::time::Instant::now();
    info!("finviz_sentiment starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => Config::load(path).await?,
        None => Config::default(),
    }
    .apply_cli(&args);
    let bucket_width = config.bucket_width()?;
    let reference_date = args
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());
    info!(
        datasets_dir = %config.datasets_dir.display(),
        results_dir = %config.results_dir.display(),
        bucket_hours = config.bucket_hours,
        %reference_date,
        "Configuration resolved"
    );

    if args.clean {
        clear_directory(&config.datasets_dir).await?;
        clear_directory(&config.results_dir).await?;
    }

    if let Err(e) = ensure_writable_dir(&config.results_dir).await {
        error!(
            path = %config.results_dir.display(),
            error = %e,
            "Results directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Fetch snapshots ----
    if !args.fetch.is_empty() {
        let client = FinvizClient::new(&config.user_agent)?;
        finviz::fetch_snapshots(
            &client,
            &args.fetch,
            &config.datasets_dir,
            config.fetch_concurrency,
        )
        .await?;
    }

    // ---- Load and run the pipeline ----
    let diagnostics = RunDiagnostics::new();
    let documents = match finviz::load_snapshots(&config.datasets_dir, Some(&diagnostics)).await {
        Ok(documents) => documents,
        Err(e) => {
            error!(
                path = %config.datasets_dir.display(),
                error = %e,
                "Datasets directory unreadable; fetch some tickers first"
            );
            return Err(e.into());
        }
    };

    let options = PipelineOptions {
        reference_date,
        news_table_id: config.news_table_id.clone(),
        bucket_width,
        scoring_failure: config.scoring_failure,
    };
    let scorer = LexiconScorer::new();
    let output = pipeline::run(documents, &options, &scorer, Some(&diagnostics))?;

    summary::log_preview(&output.records, config.preview_rows);

    // ---- Outputs ----
    tables::write_tables(&config.results_dir, &output.records, &output.buckets).await?;
    let trend = json::build_trend(&output.buckets, reference_date, config.bucket_hours);
    json::write_trend(&trend, &config.results_dir).await?;

    let counts = diagnostics.counts();
    let elapsed = start_time.elapsed();
    info!(
        records = output.records.len(),
        buckets = output.buckets.len(),
        missing_tables = counts.missing_tables,
        extraction_faults = counts.extraction_faults,
        malformed_rows = counts.malformed_rows,
        unresolved_times = counts.unresolved_times,
        duplicates = counts.duplicates,
        scoring_faults = counts.scoring_faults,
        ?elapsed,
        "Execution complete"
    );

    Ok(())
}
