//! Per-ticker preview of normalized headlines in the log.

use itertools::Itertools;
use tracing::info;

use crate::models::{ScoredRecord, canonical_timestamp};
use crate::utils::truncate_for_log;

/// First `n` records of each ticker, tickers in alphabetical order and
/// records in pipeline order.
pub fn head_by_ticker(records: &[ScoredRecord], n: usize) -> Vec<(&str, Vec<&ScoredRecord>)> {
    records
        .iter()
        .map(|record| (record.ticker.as_str(), record))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(ticker, _)| *ticker)
        .map(|(ticker, group)| (ticker, group.into_iter().take(n).collect()))
        .collect()
}

/// Log the first `n` records of each ticker. `n == 0` logs nothing.
pub fn log_preview(records: &[ScoredRecord], n: usize) {
    if n == 0 {
        return;
    }
    for (ticker, head) in head_by_ticker(records, n) {
        info!(%ticker, shown = head.len(), "Latest headlines");
        for record in head {
            info!(
                %ticker,
                time = %canonical_timestamp(&record.timestamp),
                sentiment = record.sentiment,
                headline = %truncate_for_log(&record.headline, 120),
                "  headline"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(ticker: &str, headline: &str) -> ScoredRecord {
        ScoredRecord {
            ticker: ticker.to_string(),
            raw_time: String::new(),
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            headline: headline.to_string(),
            sentiment: 0.0,
        }
    }

    #[test]
    fn test_head_by_ticker() {
        let records = vec![
            record("BBB", "b1"),
            record("AAA", "a1"),
            record("BBB", "b2"),
            record("AAA", "a2"),
            record("AAA", "a3"),
        ];

        let heads = head_by_ticker(&records, 2);

        assert_eq!(heads.len(), 2);
        assert_eq!(heads[0].0, "AAA");
        let a: Vec<&str> = heads[0].1.iter().map(|r| r.headline.as_str()).collect();
        assert_eq!(a, vec!["a1", "a2"]);
        assert_eq!(heads[1].1.len(), 2);
    }

    #[test]
    fn test_log_preview_zero_is_noop() {
        log_preview(&[record("AAA", "a1")], 0);
    }
}
