//! Run configuration loaded from an optional YAML file.
//!
//! Every key is optional; missing keys take the defaults below. Command-line
//! flags are applied on top with [`Config::apply_cli`].
//!
//! ```yaml
//! datasets_dir: datasets
//! results_dir: results
//! news_table_id: news-table
//! bucket_hours: 3
//! scoring_failure: neutral   # or: abort
//! preview_rows: 5
//! fetch_concurrency: 4
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::errors::PipelineError;
use crate::pipeline::aggregate::BucketWidth;
use crate::pipeline::extract::DEFAULT_NEWS_TABLE_ID;
use crate::pipeline::sentiment::ScoringFailurePolicy;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where snapshots are fetched to and loaded from.
    pub datasets_dir: PathBuf,
    /// Where CSV and JSON artifacts are written.
    pub results_dir: PathBuf,
    /// Element id of the news listing inside a snapshot.
    pub news_table_id: String,
    /// Aggregation bucket width in hours.
    pub bucket_hours: u32,
    /// User-Agent sent when fetching pages.
    pub user_agent: String,
    pub scoring_failure: ScoringFailurePolicy,
    /// Rows per ticker to log after normalization; 0 disables the preview.
    pub preview_rows: usize,
    pub fetch_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datasets_dir: PathBuf::from("datasets"),
            results_dir: PathBuf::from("results"),
            news_table_id: DEFAULT_NEWS_TABLE_ID.to_string(),
            bucket_hours: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scoring_failure: ScoringFailurePolicy::Neutral,
            preview_rows: 5,
            fetch_concurrency: 4,
        }
    }
}

impl Config {
    /// Parse a YAML document; an empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, PipelineError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded configuration");
        Ok(config)
    }

    /// Overlay values given on the command line.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.datasets_dir {
            self.datasets_dir = dir.clone();
        }
        if let Some(dir) = &cli.results_dir {
            self.results_dir = dir.clone();
        }
        if let Some(hours) = cli.bucket_hours {
            self.bucket_hours = hours;
        }
        if let Some(rows) = cli.preview {
            self.preview_rows = rows;
        }
        self
    }

    /// Bucket width from `bucket_hours`, rejected when zero or above 24.
    pub fn bucket_width(&self) -> Result<BucketWidth, PipelineError> {
        BucketWidth::hours(i64::from(self.bucket_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.datasets_dir, PathBuf::from("datasets"));
        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert_eq!(config.news_table_id, "news-table");
        assert_eq!(config.bucket_hours, 3);
        assert_eq!(config.scoring_failure, ScoringFailurePolicy::Neutral);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("bucket_hours: 6\nscoring_failure: abort\n").unwrap();
        assert_eq!(config.bucket_hours, 6);
        assert_eq!(config.scoring_failure, ScoringFailurePolicy::Abort);
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(matches!(
            Config::from_yaml("bucket_hours: [1, 2]"),
            Err(PipelineError::Yaml(_))
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "finviz_sentiment",
            "--results-dir",
            "/tmp/out",
            "--bucket-hours",
            "1",
        ]);
        let config = Config::default().apply_cli(&cli);
        assert_eq!(config.results_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.datasets_dir, PathBuf::from("datasets"));
        assert_eq!(config.bucket_width().unwrap().seconds(), 3600);
    }

    #[test]
    fn test_zero_bucket_hours_rejected() {
        let config = Config {
            bucket_hours: 0,
            ..Config::default()
        };
        assert!(config.bucket_width().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "datasets_dir: snapshots\npreview_rows: 0\n").unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.datasets_dir, PathBuf::from("snapshots"));
        assert_eq!(config.preview_rows, 0);
    }
}
