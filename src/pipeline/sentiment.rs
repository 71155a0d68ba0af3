//! Attach a polarity score to each normalized record.
//!
//! Scoring itself is delegated to a [`PolarityScorer`]. The stage only applies
//! it per record and enforces the failure policy: with
//! [`ScoringFailurePolicy::Neutral`] a failed score becomes `0.0` and is
//! reported, with [`ScoringFailurePolicy::Abort`] the first failure ends the
//! batch.
//!
//! [`LexiconScorer`] is the bundled scorer: a small financial word list with
//! negation and intensifier handling.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::models::{ResolvedRecord, ScoredRecord};
use crate::pipeline::diagnostics::{Diagnostic, Reporter, emit};

/// External polarity capability.
pub trait PolarityScorer {
    /// Score `text` in `[-1.0, 1.0]`; negative is bearish, positive bullish.
    fn polarity(&self, text: &str) -> Result<f64, String>;
}

/// What to do when the scorer fails on one headline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringFailurePolicy {
    #[default]
    Neutral,
    Abort,
}

impl fmt::Display for ScoringFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => f.write_str("neutral"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// Score every record. Scores are clamped into `[-1.0, 1.0]`; non-finite
/// scores count as failures.
#[instrument(level = "info", skip_all, fields(records = records.len(), %policy))]
pub fn score_records(
    records: Vec<ResolvedRecord>,
    scorer: &dyn PolarityScorer,
    policy: ScoringFailurePolicy,
    reporter: Option<&dyn Reporter>,
) -> Result<Vec<ScoredRecord>, PipelineError> {
    let mut scored = Vec::with_capacity(records.len());

    for record in records {
        let outcome = scorer.polarity(&record.headline).and_then(|score| {
            if score.is_finite() {
                Ok(score.clamp(-1.0, 1.0))
            } else {
                Err(format!("non-finite score {score}"))
            }
        });

        let sentiment = match (outcome, policy) {
            (Ok(score), _) => score,
            (Err(reason), ScoringFailurePolicy::Abort) => {
                return Err(PipelineError::ScoringFault {
                    ticker: record.ticker,
                    headline: record.headline,
                    reason,
                });
            }
            (Err(reason), ScoringFailurePolicy::Neutral) => {
                emit(
                    reporter,
                    Diagnostic::ScoringFault {
                        ticker: record.ticker.clone(),
                        headline: record.headline.clone(),
                        reason,
                    },
                );
                0.0
            }
        };
        scored.push(ScoredRecord::from_resolved(record, sentiment));
    }

    info!(count = scored.len(), "Scored records");
    Ok(scored)
}

/// Rule-based financial lexicon scorer.
///
/// The score is the mean of matched word scores, with a negation flipping the
/// next match and an intensifier scaling it, clamped to `[-1.0, 1.0]`. Text
/// with no matched words is neutral.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let words = [
            ("bullish", 0.8),
            ("surge", 0.7),
            ("rally", 0.7),
            ("soar", 0.8),
            ("jump", 0.6),
            ("gain", 0.5),
            ("profit", 0.6),
            ("growth", 0.6),
            ("rise", 0.5),
            ("climb", 0.5),
            ("improve", 0.5),
            ("outperform", 0.7),
            ("beat", 0.6),
            ("exceed", 0.6),
            ("strong", 0.5),
            ("positive", 0.5),
            ("optimistic", 0.6),
            ("record", 0.6),
            ("upgrade", 0.6),
            ("buy", 0.5),
            ("win", 0.6),
            ("recovery", 0.5),
            ("rebound", 0.5),
            ("good", 0.7),
            ("great", 0.8),
            ("bearish", -0.8),
            ("crash", -0.9),
            ("plunge", -0.8),
            ("slump", -0.7),
            ("drop", -0.6),
            ("fall", -0.5),
            ("slide", -0.5),
            ("decline", -0.6),
            ("loss", -0.6),
            ("weak", -0.5),
            ("negative", -0.5),
            ("pessimistic", -0.6),
            ("concern", -0.5),
            ("worry", -0.5),
            ("fear", -0.6),
            ("risk", -0.4),
            ("miss", -0.6),
            ("disappoint", -0.7),
            ("underperform", -0.6),
            ("downgrade", -0.6),
            ("sell", -0.5),
            ("cut", -0.4),
            ("lawsuit", -0.6),
            ("probe", -0.5),
            ("recall", -0.5),
            ("crisis", -0.8),
            ("warning", -0.5),
            ("fraud", -0.9),
            ("bad", -0.7),
        ]
        .into_iter()
        .collect();

        let negations = vec![
            "not", "no", "never", "cannot", "can't", "cant", "don't", "dont", "doesn't",
            "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt", "aren't", "arent",
            "wasn't", "wasnt", "hardly", "barely",
        ];

        let intensifiers = [
            ("very", 1.5),
            ("extremely", 2.0),
            ("highly", 1.5),
            ("sharply", 1.5),
            ("significantly", 1.5),
            ("slightly", 0.5),
            ("somewhat", 0.7),
            ("marginally", 0.5),
        ]
        .into_iter()
        .collect();

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    /// Look up a word, falling back to a few inflection suffixes
    /// (`surges`, `dropped`, `falling`).
    fn word_score(&self, word: &str) -> Option<f64> {
        if let Some(score) = self.words.get(word) {
            return Some(*score);
        }
        ["s", "es", "ed", "d", "ing"].iter().find_map(|suffix| {
            let stem = word.strip_suffix(suffix)?;
            self.words.get(stem).copied().or_else(|| {
                // dropped -> drop, slipping -> slip
                let mut chars = stem.chars();
                let last = chars.next_back()?;
                let rest = chars.as_str();
                if rest.ends_with(last) {
                    self.words.get(rest).copied()
                } else {
                    None
                }
            })
        })
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64, String> {
        let mut scores = Vec::new();
        let mut negate_next = false;
        let mut intensity = 1.0;

        for token in text.split_whitespace() {
            let word = token
                .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase();
            if word.is_empty() {
                continue;
            }

            if self.negations.iter().any(|negation| *negation == word) {
                negate_next = true;
                continue;
            }
            if let Some(multiplier) = self.intensifiers.get(word.as_str()) {
                intensity = *multiplier;
                continue;
            }
            if let Some(mut score) = self.word_score(&word) {
                if negate_next {
                    score = -score;
                    negate_next = false;
                }
                scores.push(score * intensity);
                intensity = 1.0;
            }
        }

        if scores.is_empty() {
            return Ok(0.0);
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        Ok(mean.clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::diagnostics::RunDiagnostics;
    use chrono::NaiveDate;

    struct FailingOn(&'static str);

    impl PolarityScorer for FailingOn {
        fn polarity(&self, text: &str) -> Result<f64, String> {
            if text.contains(self.0) {
                Err("scorer unavailable".to_string())
            } else {
                Ok(2.5)
            }
        }
    }

    fn record(headline: &str) -> ResolvedRecord {
        ResolvedRecord {
            ticker: "AAA".to_string(),
            raw_time: "Today 10:00AM".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            headline: headline.to_string(),
        }
    }

    #[test]
    fn test_lexicon_positive_negative_neutral() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("Shares surge after record quarter").unwrap() > 0.0);
        assert!(scorer.polarity("Stock plunges on fraud probe").unwrap() < 0.0);
        assert_eq!(scorer.polarity("Company schedules annual meeting").unwrap(), 0.0);
    }

    #[test]
    fn test_lexicon_negation_and_intensifier() {
        let scorer = LexiconScorer::new();
        let plain = scorer.polarity("results good").unwrap();
        let negated = scorer.polarity("results not good").unwrap();
        let boosted = scorer.polarity("results very good").unwrap();

        assert!((negated + plain).abs() < 1e-9);
        assert!(boosted > plain);
        assert!(boosted <= 1.0);
    }

    #[test]
    fn test_lexicon_inflections() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("shares dropped").unwrap() < 0.0);
        assert!(scorer.polarity("analysts upgraded").unwrap() > 0.0);
        assert!(scorer.polarity("stock falling").unwrap() < 0.0);
    }

    #[test]
    fn test_score_records_clamps_scores() {
        let scored = score_records(
            vec![record("fine")],
            &FailingOn("never"),
            ScoringFailurePolicy::Neutral,
            None,
        )
        .unwrap();
        assert_eq!(scored[0].sentiment, 1.0);
    }

    #[test]
    fn test_score_records_neutral_fallback() {
        let diagnostics = RunDiagnostics::new();
        let scored = score_records(
            vec![record("fine"), record("broken headline")],
            &FailingOn("broken"),
            ScoringFailurePolicy::Neutral,
            Some(&diagnostics),
        )
        .unwrap();

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[1].sentiment, 0.0);
        assert_eq!(diagnostics.counts().scoring_faults, 1);
    }

    #[test]
    fn test_score_records_abort_policy() {
        let result = score_records(
            vec![record("fine"), record("broken headline")],
            &FailingOn("broken"),
            ScoringFailurePolicy::Abort,
            None,
        );
        assert!(matches!(result, Err(PipelineError::ScoringFault { .. })));
    }
}
