//! Artifacts handed to the persistence and charting collaborators.
//!
//! # Submodules
//!
//! - [`tables`]: CSV record and bucket tables
//! - [`json`]: chart-ready trend series
//! - [`summary`]: per-ticker preview in the log
//!
//! # Output Structure
//!
//! ```text
//! results_dir/
//! ├── news_data.csv             # Ticker, Time, Headline
//! ├── news_with_sentiment.csv   # Ticker, Time, Headline, Sentiment
//! ├── sentiment_buckets.csv     # Ticker, BucketStart, MeanSentiment, Count
//! └── sentiment_trend.json      # one ascending series per ticker
//! ```

pub mod json;
pub mod summary;
pub mod tables;
