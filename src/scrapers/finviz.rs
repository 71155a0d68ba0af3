//! Finviz quote page snapshots.
//!
//! Fetches `https://finviz.com/quote.ashx?t={TICKER}` for each requested
//! ticker and stores the body as `{datasets_dir}/{ticker}_finviz.html`.
//! Loading goes the other way: every file in the datasets directory becomes a
//! [`SourceDocument`] whose ticker is the file name prefix before the first `_`.
//!
//! Failed downloads are logged and skipped. There is no retry.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::PipelineError;
use crate::models::SourceDocument;
use crate::pipeline::diagnostics::{Diagnostic, Reporter, emit};

/// Quote page; the ticker goes in the `t` query parameter.
pub const FINVIZ_QUOTE_URL: &str = "https://finviz.com/quote.ashx";
const SNAPSHOT_SUFFIX: &str = "_finviz.html";

/// Fetch-by-ticker capability returning the raw page bytes.
pub trait PageSource {
    async fn fetch(&self, ticker: &str) -> Result<Vec<u8>, PipelineError>;
}

/// [`PageSource`] backed by the live Finviz site.
#[derive(Debug, Clone)]
pub struct FinvizClient {
    client: Client,
    base_url: Url,
}

impl FinvizClient {
    /// Build a client that sends `user_agent` on every request.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Config`] for a user agent that is not a valid header
    /// value, [`PipelineError::Http`] when the TLS backend fails to start.
    pub fn new(user_agent: &str) -> Result<Self, PipelineError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(user_agent)
            .map_err(|e| PipelineError::Config(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder().default_headers(headers).build()?;
        let base_url = Url::parse(FINVIZ_QUOTE_URL)
            .map_err(|e| PipelineError::Config(format!("invalid quote url: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// Quote page URL for `ticker`, upper-cased.
    pub fn quote_url(&self, ticker: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().clear().append_pair("t", &ticker.to_uppercase());
        url
    }
}

impl PageSource for FinvizClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, ticker: &str) -> Result<Vec<u8>, PipelineError> {
        let url = self.quote_url(ticker);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

/// File name a ticker's snapshot is stored under.
pub fn snapshot_file_name(ticker: &str) -> String {
    format!("{}{}", ticker.to_lowercase(), SNAPSHOT_SUFFIX)
}

/// Ticker encoded in a snapshot file name, upper-cased.
///
/// `aapl_finviz.html` gives `AAPL`; a name without `_` uses its stem.
pub fn ticker_from_file_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let ticker = stem.split('_').next()?.trim();
    if ticker.is_empty() {
        None
    } else {
        Some(ticker.to_uppercase())
    }
}

/// Download each ticker's page and save it under `datasets_dir`.
///
/// Tickers are upper-cased and de-duplicated first. Returns the paths that
/// were written; failures are logged and left out.
#[instrument(level = "info", skip_all, fields(datasets_dir = %datasets_dir.display(), tickers = tickers.len()))]
pub async fn fetch_snapshots<S: PageSource>(
    source: &S,
    tickers: &[String],
    datasets_dir: &Path,
    concurrency: usize,
) -> Result<Vec<PathBuf>, PipelineError> {
    fs::create_dir_all(datasets_dir).await?;

    let tickers: Vec<String> = tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .unique()
        .collect();

    let written: Vec<PathBuf> = stream::iter(tickers)
        .map(|ticker| async move {
            let body = match source.fetch(&ticker).await {
                Ok(body) => body,
                Err(e) => {
                    error!(%ticker, error = %e, "Finviz fetch failed");
                    return None;
                }
            };
            let path = datasets_dir.join(snapshot_file_name(&ticker));
            match fs::write(&path, &body).await {
                Ok(()) => {
                    info!(%ticker, path = %path.display(), bytes = body.len(), "Saved snapshot");
                    Some(path)
                }
                Err(e) => {
                    error!(%ticker, path = %path.display(), error = %e, "Failed writing snapshot");
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = written.len(), "Fetched Finviz snapshots");
    Ok(written)
}

/// Read every snapshot in `datasets_dir` as a [`SourceDocument`].
///
/// Documents come back sorted by (ticker, file name). Unreadable or
/// non-UTF-8 files are reported as extraction faults and skipped.
#[instrument(level = "info", skip_all, fields(datasets_dir = %datasets_dir.display()))]
pub async fn load_snapshots(
    datasets_dir: &Path,
    reporter: Option<&dyn Reporter>,
) -> Result<Vec<SourceDocument>, PipelineError> {
    let mut entries = fs::read_dir(datasets_dir).await?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(ticker) = ticker_from_file_name(&path) else {
            warn!(path = %path.display(), "Cannot derive ticker from file name; skipping");
            continue;
        };
        let origin = entry.file_name().to_string_lossy().into_owned();

        let markup = match fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match markup {
            Ok(markup) => {
                debug!(%ticker, %origin, bytes = markup.len(), "Loaded snapshot");
                documents.push(SourceDocument {
                    ticker,
                    origin,
                    markup,
                });
            }
            Err(reason) => emit(reporter, Diagnostic::ExtractionFault { ticker, reason }),
        }
    }

    documents.sort_by(|a, b| a.ticker.cmp(&b.ticker).then_with(|| a.origin.cmp(&b.origin)));
    info!(count = documents.len(), "Loaded snapshots");
    Ok(documents)
}
