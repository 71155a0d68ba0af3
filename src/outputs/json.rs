//! Chart-ready JSON trend file.
//!
//! The charting collaborator expects one series per ticker with a monotonic
//! x-axis, so buckets are regrouped by ticker here while keeping their
//! ascending order.
//!
//! ```json
//! {
//!   "reference_date": "2024-06-10",
//!   "bucket_hours": 3,
//!   "series": [
//!     { "ticker": "AAPL", "points": [
//!       { "bucket_start": "2024/06/10 09:00:00", "mean_sentiment": 0.4, "count": 3 }
//!     ] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::models::{BucketAggregate, canonical_timestamp};

/// File name of the trend document inside the results directory.
pub const TREND_FILE: &str = "sentiment_trend.json";

/// Top-level document written to [`TREND_FILE`].
#[derive(Debug, Serialize)]
pub struct TrendReport {
    pub reference_date: String,
    pub bucket_hours: u32,
    pub series: Vec<TickerSeries>,
}

/// Every bucket of one ticker, ascending by start.
#[derive(Debug, Serialize)]
pub struct TickerSeries {
    pub ticker: String,
    pub points: Vec<TrendPoint>,
}

/// One bucket on the chart's x-axis.
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub bucket_start: String,
    pub mean_sentiment: f64,
    pub count: usize,
}

/// Group bucket aggregates into one ascending series per ticker.
pub fn build_trend(
    buckets: &[BucketAggregate],
    reference_date: NaiveDate,
    bucket_hours: u32,
) -> TrendReport {
    let series = buckets
        .iter()
        .sorted_by(|a, b| {
            a.ticker
                .cmp(&b.ticker)
                .then_with(|| a.bucket_start.cmp(&b.bucket_start))
        })
        .chunk_by(|bucket| bucket.ticker.clone())
        .into_iter()
        .map(|(ticker, group)| TickerSeries {
            ticker,
            points: group
                .map(|bucket| TrendPoint {
                    bucket_start: canonical_timestamp(&bucket.bucket_start),
                    mean_sentiment: bucket.mean_sentiment,
                    count: bucket.count,
                })
                .collect(),
        })
        .collect();

    TrendReport {
        reference_date: reference_date.to_string(),
        bucket_hours,
        series,
    }
}

/// Write the trend report as `{results_dir}/sentiment_trend.json`.
#[instrument(level = "info", skip_all, fields(results_dir = %results_dir.display()))]
pub async fn write_trend(report: &TrendReport, results_dir: &Path) -> Result<PathBuf, PipelineError> {
    let json = serde_json::to_string_pretty(report)?;
    let path = results_dir.join(TREND_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), series = report.series.len(), "Wrote trend JSON");
    Ok(path)
}
