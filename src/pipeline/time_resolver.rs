//! Turn listing time labels into absolute timestamps.
//!
//! Finviz labels rows with one of:
//! - `Today 02:15PM` / `Yesterday 02:15PM`
//! - a bare time of day, `02:15PM`
//! - an absolute date and time, `Jun-01-24 02:15PM`
//!
//! Relative labels are anchored to a caller-supplied reference date. The
//! expanded string is then tried against [`ACCEPTED_FORMATS`] in order and the
//! first format that parses wins. A label no format accepts resolves to `None`.
//!
//! Two-digit years use chrono's pivot: `00..=69` land in 2000-2069 and
//! `70..=99` in 1970-1999, so `Jun-01-69` is 2069.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use itertools::Itertools;

/// Literal marker for rows published on the reference date.
pub const TODAY_MARKER: &str = "Today";
/// Literal marker for rows published the day before the reference date.
pub const YESTERDAY_MARKER: &str = "Yesterday";

/// One accepted absolute layout.
#[derive(Debug, Clone, Copy)]
pub struct TimeFormat {
    pub name: &'static str,
    pub pattern: &'static str,
}

impl TimeFormat {
    fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, self.pattern).ok()
    }
}

/// Absolute layouts in priority order. The ISO-like form must stay first.
pub const ACCEPTED_FORMATS: &[TimeFormat] = &[
    TimeFormat {
        name: "iso_date_12h",
        pattern: "%Y-%m-%d %I:%M%p",
    },
    TimeFormat {
        name: "month_abbrev_12h",
        pattern: "%b-%d-%y %I:%M%p",
    },
];

/// Substitute relative markers and prefix bare times with a date.
///
/// The result is the string handed to the format list.
pub fn expand_relative(raw_time: &str, reference_date: NaiveDate) -> String {
    let normalized = raw_time.split_whitespace().join(" ");

    if normalized.contains(TODAY_MARKER) {
        normalized.replace(TODAY_MARKER, &reference_date.to_string())
    } else if normalized.contains(YESTERDAY_MARKER) {
        let yesterday = reference_date - Duration::days(1);
        normalized.replace(YESTERDAY_MARKER, &yesterday.to_string())
    } else if normalized.split(' ').count() == 1 {
        format!("{reference_date} {normalized}")
    } else {
        normalized
    }
}

/// Resolve a raw time label against `reference_date`.
///
/// Returns `None` when no accepted format matches; that is an expected outcome
/// for malformed rows, not an error.
pub fn resolve(raw_time: &str, reference_date: NaiveDate) -> Option<NaiveDateTime> {
    let expanded = expand_relative(raw_time, reference_date);
    ACCEPTED_FORMATS.iter().find_map(|format| format.parse(&expanded))
}

/// Like [`resolve`], but also names the format that matched.
pub fn resolve_with_format(
    raw_time: &str,
    reference_date: NaiveDate,
) -> Option<(NaiveDateTime, &'static str)> {
    let expanded = expand_relative(raw_time, reference_date);
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| format.parse(&expanded).map(|ts| (ts, format.name)))
}
