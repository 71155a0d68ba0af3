//! Acquisition of listing pages.
//!
//! Pages are fetched once and stored as snapshots; every later stage reads the
//! snapshots, never the network.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Finviz quote page | [`finviz`] | HTML download | One `{ticker}_finviz.html` per ticker |
//!
//! Each source module exports:
//! - `fetch_snapshots(...)`: downloads pages and writes them to the datasets directory
//! - `load_snapshots(dir)`: reads saved pages back as [`SourceDocument`](crate::models::SourceDocument)s

pub mod finviz;
