//! Diagnostics sink handed to every pipeline stage.
//!
//! Stages never log skipped or dropped records on their own. They describe what
//! happened with a [`Diagnostic`] and pass it to whatever [`Reporter`] the
//! caller supplied, if any.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

/// Something a stage skipped, dropped, or papered over.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The document has no news listing; it contributes nothing.
    MissingTable { ticker: String },
    /// The document could not be read or parsed.
    ExtractionFault { ticker: String, reason: String },
    /// A listing row lacks a headline link or a time cell.
    MalformedRow { ticker: String, row: usize },
    /// No accepted format matched the row's time token.
    UnresolvedTime { ticker: String, raw_time: String },
    /// A later record repeated an earlier (ticker, timestamp, headline).
    DuplicateRecord { ticker: String, headline: String },
    /// The polarity capability failed and a fallback score was used.
    ScoringFault {
        ticker: String,
        headline: String,
        reason: String,
    },
}

/// Receiver for stage diagnostics.
pub trait Reporter: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forward a diagnostic to an optional reporter.
pub(crate) fn emit(reporter: Option<&dyn Reporter>, diagnostic: Diagnostic) {
    if let Some(reporter) = reporter {
        reporter.report(&diagnostic);
    }
}

/// Point-in-time copy of the counters kept by [`RunDiagnostics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticCounts {
    pub missing_tables: usize,
    pub extraction_faults: usize,
    pub malformed_rows: usize,
    pub unresolved_times: usize,
    pub duplicates: usize,
    pub scoring_faults: usize,
}

/// Reporter that logs each diagnostic through `tracing` and counts it.
#[derive(Debug, Default)]
pub struct RunDiagnostics {
    missing_tables: AtomicUsize,
    extraction_faults: AtomicUsize,
    malformed_rows: AtomicUsize,
    unresolved_times: AtomicUsize,
    duplicates: AtomicUsize,
    scoring_faults: AtomicUsize,
}

impl RunDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every counter.
    pub fn counts(&self) -> DiagnosticCounts {
        DiagnosticCounts {
            missing_tables: self.missing_tables.load(Ordering::Relaxed),
            extraction_faults: self.extraction_faults.load(Ordering::Relaxed),
            malformed_rows: self.malformed_rows.load(Ordering::Relaxed),
            unresolved_times: self.unresolved_times.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            scoring_faults: self.scoring_faults.load(Ordering::Relaxed),
        }
    }
}

impl Reporter for RunDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::MissingTable { ticker } => {
                self.missing_tables.fetch_add(1, Ordering::Relaxed);
                warn!(%ticker, "No news table found; skipping document");
            }
            Diagnostic::ExtractionFault { ticker, reason } => {
                self.extraction_faults.fetch_add(1, Ordering::Relaxed);
                warn!(%ticker, %reason, "Document unreadable; skipping");
            }
            Diagnostic::MalformedRow { ticker, row } => {
                self.malformed_rows.fetch_add(1, Ordering::Relaxed);
                debug!(%ticker, row, "Row lacks headline or time cell");
            }
            Diagnostic::UnresolvedTime { ticker, raw_time } => {
                self.unresolved_times.fetch_add(1, Ordering::Relaxed);
                debug!(%ticker, %raw_time, "Time token did not resolve; dropping record");
            }
            Diagnostic::DuplicateRecord { ticker, headline } => {
                self.duplicates.fetch_add(1, Ordering::Relaxed);
                debug!(%ticker, %headline, "Duplicate record dropped");
            }
            Diagnostic::ScoringFault {
                ticker,
                headline,
                reason,
            } => {
                self.scoring_faults.fetch_add(1, Ordering::Relaxed);
                warn!(%ticker, %headline, %reason, "Scoring failed; using neutral polarity");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_diagnostics_counts_each_kind() {
        let diagnostics = RunDiagnostics::new();
        diagnostics.report(&Diagnostic::MissingTable {
            ticker: "AAA".to_string(),
        });
        diagnostics.report(&Diagnostic::MalformedRow {
            ticker: "AAA".to_string(),
            row: 2,
        });
        diagnostics.report(&Diagnostic::MalformedRow {
            ticker: "BBB".to_string(),
            row: 0,
        });
        diagnostics.report(&Diagnostic::UnresolvedTime {
            ticker: "BBB".to_string(),
            raw_time: "soon".to_string(),
        });

        let counts = diagnostics.counts();
        assert_eq!(counts.missing_tables, 1);
        assert_eq!(counts.malformed_rows, 2);
        assert_eq!(counts.unresolved_times, 1);
        assert_eq!(counts.duplicates, 0);
        assert_eq!(counts.scoring_faults, 0);
    }

    #[test]
    fn test_emit_without_reporter_is_noop() {
        emit(
            None,
            Diagnostic::MissingTable {
                ticker: "AAA".to_string(),
            },
        );
    }
}
