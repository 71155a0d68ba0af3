//! Resolve times, clean headlines, and drop duplicates.
//!
//! Headline cleanup keeps ASCII letters, digits, whitespace and `. , ! ? '`;
//! everything else is removed outright. Whitespace runs then collapse to a
//! single space and the ends are trimmed, so cleaning a cleaned headline is a
//! no-op.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument, trace};

use crate::models::{RawRecord, ResolvedRecord};
use crate::pipeline::diagnostics::{Diagnostic, Reporter, emit};
use crate::pipeline::time_resolver::resolve_with_format;

static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s.,!?']").expect("valid headline filter"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace"));

/// Strip disallowed symbols and normalize spacing.
pub fn clean_headline(headline: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(headline, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Resolve, clean, and deduplicate a batch of (record, reference date) pairs.
///
/// Records whose time does not resolve are dropped. Among records sharing
/// (ticker, timestamp, cleaned headline) only the first survives; survivors
/// keep the order of their first occurrence.
#[instrument(level = "info", skip_all)]
pub fn normalize<I>(batch: I, reporter: Option<&dyn Reporter>) -> Vec<ResolvedRecord>
where
    I: IntoIterator<Item = (RawRecord, NaiveDate)>,
{
    let resolved: Vec<ResolvedRecord> = batch
        .into_iter()
        .filter_map(|(record, reference_date)| {
            match resolve_with_format(&record.raw_time, reference_date) {
                Some((timestamp, format)) => {
                    trace!(raw_time = %record.raw_time, format, "Resolved time");
                    Some(ResolvedRecord {
                        ticker: record.ticker,
                        raw_time: record.raw_time,
                        timestamp,
                        headline: record.headline,
                    })
                }
                None => {
                    emit(
                        reporter,
                        Diagnostic::UnresolvedTime {
                            ticker: record.ticker,
                            raw_time: record.raw_time,
                        },
                    );
                    None
                }
            }
        })
        .collect();

    clean_and_dedup(resolved, reporter)
}

/// [`normalize`] with one reference date for the whole batch.
pub fn normalize_on(
    records: Vec<RawRecord>,
    reference_date: NaiveDate,
    reporter: Option<&dyn Reporter>,
) -> Vec<ResolvedRecord> {
    normalize(
        records.into_iter().map(|record| (record, reference_date)),
        reporter,
    )
}

/// Headline cleanup and deduplication over already-resolved records.
///
/// Idempotent: applying it to its own output changes nothing.
pub fn clean_and_dedup(
    records: Vec<ResolvedRecord>,
    reporter: Option<&dyn Reporter>,
) -> Vec<ResolvedRecord> {
    let total = records.len();
    let mut seen: HashSet<(String, NaiveDateTime, String)> = HashSet::with_capacity(total);
    let mut out = Vec::with_capacity(total);

    for record in records {
        let headline = clean_headline(&record.headline);
        let key = (record.ticker.clone(), record.timestamp, headline.clone());
        if !seen.insert(key) {
            emit(
                reporter,
                Diagnostic::DuplicateRecord {
                    ticker: record.ticker,
                    headline,
                },
            );
            continue;
        }
        out.push(ResolvedRecord { headline, ..record });
    }

    info!(input = total, kept = out.len(), "Normalized records");
    out
}
