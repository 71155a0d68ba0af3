//! Library half of `finviz_sentiment`: the extraction-and-normalization
//! pipeline plus the snapshot, config, and output plumbing the binary wires
//! together.

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod utils;
