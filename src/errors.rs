//! Error types for extraction and for whole-run failures.
//!
//! Per-document and per-row problems are deliberately small ([`ExtractError`])
//! because the pipeline swallows them after reporting. [`PipelineError`] is what
//! actually stops a run.

use std::io;

use thiserror::Error;

/// Failure to pull a news listing out of one document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no news table found for ticker '{ticker}'")]
    MissingTable { ticker: String },
    #[error("document for ticker '{ticker}' could not be read: {reason}")]
    Fault { ticker: String, reason: String },
}

/// Error type for configuration, IO, output, and scoring failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("bucket width must be between 1 second and 24 hours, got {seconds}s")]
    InvalidBucketWidth { seconds: i64 },
    #[error("scoring failed for {ticker} headline '{headline}': {reason}")]
    ScoringFault {
        ticker: String,
        headline: String,
        reason: String,
    },
}
