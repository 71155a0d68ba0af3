//! Fixed-width time buckets of mean polarity per ticker.
//!
//! Buckets are anchored at midnight of each record's own day: with a 3 hour
//! width the boundaries are 00:00, 03:00, 06:00 and so on, whatever the first
//! record of a ticker looks like.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::models::{BucketAggregate, ScoredRecord};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Width of an aggregation bucket, between one second and one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWidth(Duration);

impl BucketWidth {
    /// Validate a bucket width.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidBucketWidth`] when `width` is not positive or
    /// is longer than one day.
    pub fn new(width: Duration) -> Result<Self, PipelineError> {
        let seconds = width.num_seconds();
        if seconds <= 0 || seconds > SECONDS_PER_DAY {
            return Err(PipelineError::InvalidBucketWidth { seconds });
        }
        Ok(Self(width))
    }

    /// Whole-hour width; same bounds as [`BucketWidth::new`].
    pub fn hours(hours: i64) -> Result<Self, PipelineError> {
        Self::new(Duration::hours(hours))
    }

    /// Width in whole seconds.
    pub fn seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Start of the bucket containing `ts`, counted from that day's midnight.
    pub fn floor(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let since_midnight = i64::from(ts.time().num_seconds_from_midnight());
        let floored = since_midnight - since_midnight % self.seconds();
        ts.date().and_time(NaiveTime::MIN) + Duration::seconds(floored)
    }
}

impl Default for BucketWidth {
    fn default() -> Self {
        Self(Duration::hours(3))
    }
}

/// Group records by (ticker, bucket start) and average their sentiment.
///
/// Output is ordered by ticker, then by ascending bucket start. Empty buckets
/// are not emitted.
#[instrument(level = "info", skip_all, fields(records = records.len(), width_secs = width.seconds()))]
pub fn aggregate(records: &[ScoredRecord], width: BucketWidth) -> Vec<BucketAggregate> {
    let mut groups: BTreeMap<(&str, NaiveDateTime), (f64, usize)> = BTreeMap::new();
    for record in records {
        let key = (record.ticker.as_str(), width.floor(record.timestamp));
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += record.sentiment;
        entry.1 += 1;
    }

    let buckets: Vec<BucketAggregate> = groups
        .into_iter()
        .map(|((ticker, bucket_start), (sum, count))| BucketAggregate {
            ticker: ticker.to_string(),
            bucket_start,
            mean_sentiment: sum / count as f64,
            count,
        })
        .collect();

    info!(buckets = buckets.len(), "Aggregated sentiment buckets");
    buckets
}
