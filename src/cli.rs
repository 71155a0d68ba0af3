//! Command-line interface definitions.
//!
//! Flags override the matching keys of the optional YAML config file.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for finviz_sentiment.
///
/// # Examples
///
/// ```sh
/// # Score snapshots already saved under ./datasets
/// finviz_sentiment
///
/// # Start clean, fetch two tickers, then score them in 1 hour buckets
/// finviz_sentiment --clean --fetch AAPL TSLA --bucket-hours 1
///
/// # Re-run an old snapshot set as of the day it was captured
/// finviz_sentiment -d ./archive/2024-06-10 --reference-date 2024-06-10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "FINVIZ_SENTIMENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding `{ticker}_finviz.html` snapshots
    #[arg(short, long, env = "FINVIZ_SENTIMENT_DATASETS_DIR")]
    pub datasets_dir: Option<PathBuf>,

    /// Directory the CSV and JSON results are written to
    #[arg(short, long, env = "FINVIZ_SENTIMENT_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    /// Tickers to download before processing
    #[arg(short, long, num_args = 1..)]
    pub fetch: Vec<String>,

    /// Empty the datasets and results directories first
    #[arg(long)]
    pub clean: bool,

    /// Date that "Today", "Yesterday" and bare times resolve against (YYYY-MM-DD); defaults to the local date
    #[arg(long)]
    pub reference_date: Option<NaiveDate>,

    /// Width of a sentiment bucket in hours
    #[arg(short, long, env = "FINVIZ_SENTIMENT_BUCKET_HOURS")]
    pub bucket_hours: Option<u32>,

    /// Headlines per ticker to log after normalization
    #[arg(short, long)]
    pub preview: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["finviz_sentiment"]);
        assert!(cli.config.is_none());
        assert!(cli.fetch.is_empty());
        assert!(!cli.clean);
        assert!(cli.reference_date.is_none());
    }

    #[test]
    fn test_cli_fetch_and_reference_date() {
        let cli = Cli::parse_from([
            "finviz_sentiment",
            "--fetch",
            "AAPL",
            "tsla",
            "--reference-date",
            "2024-06-10",
            "--clean",
        ]);

        assert_eq!(cli.fetch, vec!["AAPL", "tsla"]);
        assert_eq!(cli.reference_date, NaiveDate::from_ymd_opt(2024, 6, 10));
        assert!(cli.clean);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "finviz_sentiment",
            "-d",
            "/tmp/datasets",
            "-r",
            "/tmp/results",
            "-b",
            "6",
        ]);

        assert_eq!(cli.datasets_dir, Some(PathBuf::from("/tmp/datasets")));
        assert_eq!(cli.results_dir, Some(PathBuf::from("/tmp/results")));
        assert_eq!(cli.bucket_hours, Some(6));
    }

    #[test]
    fn test_cli_env_fallbacks() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id().as_str() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("config").as_deref(), Some("FINVIZ_SENTIMENT_CONFIG"));
        assert_eq!(env_of("datasets_dir").as_deref(), Some("FINVIZ_SENTIMENT_DATASETS_DIR"));
        assert_eq!(env_of("results_dir").as_deref(), Some("FINVIZ_SENTIMENT_RESULTS_DIR"));
        assert_eq!(env_of("bucket_hours").as_deref(), Some("FINVIZ_SENTIMENT_BUCKET_HOURS"));
        assert_eq!(env_of("reference_date"), None);
    }

    #[test]
    fn test_cli_rejects_bad_reference_date() {
        assert!(Cli::try_parse_from(["finviz_sentiment", "--reference-date", "06/10/2024"]).is_err());
    }
}
