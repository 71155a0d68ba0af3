//! CSV tables of records and bucket aggregates.
//!
//! Rows are rendered in memory with the `csv` crate and written in one go, so
//! a failed run never leaves a half-written table behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::models::{BucketAggregate, ScoredRecord, canonical_timestamp};

/// Normalized records: `Ticker,Time,Headline`.
pub const NEWS_DATA_FILE: &str = "news_data.csv";
/// Scored records: `Ticker,Time,Headline,Sentiment`.
pub const NEWS_WITH_SENTIMENT_FILE: &str = "news_with_sentiment.csv";
/// Bucket aggregates: `Ticker,BucketStart,MeanSentiment,Count`.
pub const BUCKETS_FILE: &str = "sentiment_buckets.csv";

const NEWS_DATA_HEADER: [&str; 3] = ["Ticker", "Time", "Headline"];
const NEWS_WITH_SENTIMENT_HEADER: [&str; 4] = ["Ticker", "Time", "Headline", "Sentiment"];
const BUCKETS_HEADER: [&str; 4] = ["Ticker", "BucketStart", "MeanSentiment", "Count"];

#[derive(Serialize)]
struct NewsRow<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Headline")]
    headline: &'a str,
}

/// Header first, then one line per row. A table with no rows is header-only.
fn render<T: Serialize>(
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

async fn write_table(path: &Path, bytes: Vec<u8>, rows: usize) -> Result<(), PipelineError> {
    fs::write(path, bytes).await?;
    info!(path = %path.display(), rows, "Wrote CSV table");
    Ok(())
}

/// Render the normalized record table (no sentiment column).
pub fn render_news_data(records: &[ScoredRecord]) -> Result<Vec<u8>, PipelineError> {
    render(&NEWS_DATA_HEADER, records.iter().map(|r| NewsRow {
        ticker: &r.ticker,
        time: canonical_timestamp(&r.timestamp),
        headline: &r.headline,
    }))
}

/// Render the scored record table, one `Sentiment` column past the news table.
pub fn render_scored(records: &[ScoredRecord]) -> Result<Vec<u8>, PipelineError> {
    render(&NEWS_WITH_SENTIMENT_HEADER, records)
}

/// Render one row per (ticker, bucket start) aggregate.
pub fn render_buckets(buckets: &[BucketAggregate]) -> Result<Vec<u8>, PipelineError> {
    render(&BUCKETS_HEADER, buckets)
}

/// Write all three tables into `results_dir` and return their paths.
#[instrument(level = "info", skip_all, fields(results_dir = %results_dir.display()))]
pub async fn write_tables(
    results_dir: &Path,
    records: &[ScoredRecord],
    buckets: &[BucketAggregate],
) -> Result<Vec<PathBuf>, PipelineError> {
    let outputs = [
        (NEWS_DATA_FILE, render_news_data(records)?, records.len()),
        (NEWS_WITH_SENTIMENT_FILE, render_scored(records)?, records.len()),
        (BUCKETS_FILE, render_buckets(buckets)?, buckets.len()),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, bytes, rows) in outputs {
        let path = results_dir.join(name);
        write_table(&path, bytes, rows).await?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(headline: &str, sentiment: f64) -> ScoredRecord {
        ScoredRecord {
            ticker: "AAA".to_string(),
            raw_time: "Today 02:15PM".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(14, 15, 0)
                .unwrap(),
            headline: headline.to_string(),
            sentiment,
        }
    }

    #[test]
    fn test_render_news_data() {
        let bytes = render_news_data(&[record("Shares rise, again", 0.5)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Ticker,Time,Headline\nAAA,2024/06/01 14:15:00,\"Shares rise, again\"\n"
        );
    }

    #[test]
    fn test_render_scored_has_sentiment_column() {
        let bytes = render_scored(&[record("Up", -0.25)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Ticker,Time,Headline,Sentiment"));
        assert_eq!(lines.next(), Some("AAA,2024/06/01 14:15:00,Up,-0.25"));
    }

    #[test]
    fn test_render_buckets() {
        let bucket = BucketAggregate {
            ticker: "AAA".to_string(),
            bucket_start: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            mean_sentiment: 0.5,
            count: 2,
        };
        let text = String::from_utf8(render_buckets(&[bucket]).unwrap()).unwrap();
        assert_eq!(
            text,
            "Ticker,BucketStart,MeanSentiment,Count\nAAA,2024/06/01 12:00:00,0.5,2\n"
        );
    }

    #[tokio::test]
    async fn test_write_tables() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_tables(dir.path(), &[record("Up", 0.1)], &[]).await.unwrap();

        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
        }
        let buckets = std::fs::read_to_string(dir.path().join(BUCKETS_FILE)).unwrap();
        assert_eq!(buckets, "Ticker,BucketStart,MeanSentiment,Count\n");
    }

    #[test]
    fn test_empty_tables_keep_their_header() {
        let news = String::from_utf8(render_news_data(&[]).unwrap()).unwrap();
        assert_eq!(news, "Ticker,Time,Headline\n");
        let scored = String::from_utf8(render_scored(&[]).unwrap()).unwrap();
        assert_eq!(scored, "Ticker,Time,Headline,Sentiment\n");
        let buckets = String::from_utf8(render_buckets(&[]).unwrap()).unwrap();
        assert_eq!(buckets, "Ticker,BucketStart,MeanSentiment,Count\n");
    }
}
