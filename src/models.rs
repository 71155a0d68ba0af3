//! Data models passed between pipeline stages.
//!
//! Each stage consumes the previous stage's collection by value and emits a new
//! one:
//! - [`SourceDocument`]: one saved listing page keyed by ticker
//! - [`RawRecord`]: a (ticker, raw time, headline) triple pulled from a table row
//! - [`ResolvedRecord`]: a record whose time resolved to an absolute timestamp
//! - [`ScoredRecord`]: a resolved record with a polarity score attached
//! - [`BucketAggregate`]: mean polarity of one ticker over one time bucket
//!
//! Timestamps are naive local time. Wherever they are serialized they use the
//! canonical `YYYY/MM/DD HH:MM:SS` form.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Canonical textual form of a resolved timestamp.
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Render a timestamp in the canonical `YYYY/MM/DD HH:MM:SS` form.
pub fn canonical_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(CANONICAL_TIMESTAMP_FORMAT).to_string()
}

fn serialize_canonical<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&canonical_timestamp(ts))
}

/// A saved listing page for one ticker.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Upper-case ticker the page belongs to.
    pub ticker: String,
    /// Where the markup came from (file name or URL), for diagnostics.
    pub origin: String,
    /// Raw UTF-8 markup.
    pub markup: String,
}

/// One listing row as found in the markup.
///
/// The ticker comes from the document, never from the row content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub ticker: String,
    pub raw_time: String,
    pub headline: String,
}

/// A record whose time token resolved to an absolute timestamp.
///
/// Unresolvable records are never constructed, so every value of this type
/// is eligible for the downstream stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(skip)]
    pub raw_time: String,
    #[serde(rename = "Time", serialize_with = "serialize_canonical")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Headline")]
    pub headline: String,
}

/// A resolved record with a polarity in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(skip)]
    pub raw_time: String,
    #[serde(rename = "Time", serialize_with = "serialize_canonical")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Headline")]
    pub headline: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: f64,
}

impl ScoredRecord {
    pub fn from_resolved(record: ResolvedRecord, sentiment: f64) -> Self {
        Self {
            ticker: record.ticker,
            raw_time: record.raw_time,
            timestamp: record.timestamp,
            headline: record.headline,
            sentiment,
        }
    }
}

/// Mean polarity of one ticker inside one aligned time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAggregate {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "BucketStart", serialize_with = "serialize_canonical")]
    pub bucket_start: NaiveDateTime,
    #[serde(rename = "MeanSentiment")]
    pub mean_sentiment: f64,
    /// Number of contributing records, always at least one.
    #[serde(rename = "Count")]
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_canonical_timestamp() {
        assert_eq!(canonical_timestamp(&ts(14, 15)), "2024/06/01 14:15:00");
        assert_eq!(canonical_timestamp(&ts(0, 5)), "2024/06/01 00:05:00");
    }

    #[test]
    fn test_resolved_record_serialization_uses_column_names() {
        let record = ResolvedRecord {
            ticker: "AAPL".to_string(),
            raw_time: "Today 02:15PM".to_string(),
            timestamp: ts(14, 15),
            headline: "Apple beats estimates".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Ticker"], "AAPL");
        assert_eq!(json["Time"], "2024/06/01 14:15:00");
        assert_eq!(json["Headline"], "Apple beats estimates");
        assert!(json.get("raw_time").is_none());
    }

    #[test]
    fn test_scored_record_from_resolved() {
        let record = ResolvedRecord {
            ticker: "TSLA".to_string(),
            raw_time: "Jun-01-24 09:00AM".to_string(),
            timestamp: ts(9, 0),
            headline: "Tesla shares drop".to_string(),
        };

        let scored = ScoredRecord::from_resolved(record, -0.6);
        assert_eq!(scored.ticker, "TSLA");
        assert_eq!(scored.timestamp, ts(9, 0));
        assert_eq!(scored.sentiment, -0.6);
    }

    #[test]
    fn test_bucket_aggregate_serialization() {
        let bucket = BucketAggregate {
            ticker: "AAA".to_string(),
            bucket_start: ts(12, 0),
            mean_sentiment: 0.25,
            count: 2,
        };

        let json = serde_json::to_string(&bucket).unwrap();
        assert!(json.contains("\"BucketStart\":\"2024/06/01 12:00:00\""));
        assert!(json.contains("\"Count\":2"));
    }
}
