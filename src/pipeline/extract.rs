//! Pull (ticker, raw time, headline) triples out of a listing page.
//!
//! The listing is the element carrying the configured table id. Each row must
//! have a link (the headline) and a plain cell (the time label); rows missing
//! either are skipped. Extraction of one document never touches another, so
//! callers may run documents in any order as long as they merge with
//! [`extract_all`] ordering rules.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

use crate::errors::ExtractError;
use crate::models::{RawRecord, SourceDocument};
use crate::pipeline::diagnostics::{Diagnostic, Reporter, emit};

/// Element id Finviz uses for its news listing.
pub const DEFAULT_NEWS_TABLE_ID: &str = "news-table";

struct ListingSelectors {
    table: Selector,
    row: Selector,
    cell: Selector,
    link: Selector,
}

impl ListingSelectors {
    fn new(table_id: &str) -> Result<Self, String> {
        let parse = |css: &str| Selector::parse(css).map_err(|e| format!("bad selector {css:?}: {e}"));
        Ok(Self {
            table: parse(&format!("[id=\"{table_id}\"]"))?,
            row: parse("tr")?,
            cell: parse("td")?,
            link: parse("a")?,
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract every valid listing row of one document, in row order.
///
/// Tickers are upper-cased on the way out whatever case the document carries.
/// Returns [`ExtractError::MissingTable`] when the page has no listing; the
/// caller treats that as "zero records", not as a batch failure.
#[instrument(level = "debug", skip_all, fields(ticker = %document.ticker, origin = %document.origin))]
pub fn extract_document(
    document: &SourceDocument,
    table_id: &str,
    reporter: Option<&dyn Reporter>,
) -> Result<Vec<RawRecord>, ExtractError> {
    let ticker = document.ticker.to_uppercase();
    let selectors = ListingSelectors::new(table_id).map_err(|reason| ExtractError::Fault {
        ticker: ticker.clone(),
        reason,
    })?;

    let html = Html::parse_document(&document.markup);
    let Some(table) = html.select(&selectors.table).next() else {
        return Err(ExtractError::MissingTable { ticker });
    };

    let mut records = Vec::new();
    for (index, row) in table.select(&selectors.row).enumerate() {
        let headline = row.select(&selectors.link).next().map(element_text);
        // The time label is the first cell that is not the headline's cell.
        let raw_time = row
            .select(&selectors.cell)
            .find(|cell| cell.select(&selectors.link).next().is_none())
            .map(element_text);

        match (headline, raw_time) {
            (Some(headline), Some(raw_time)) => records.push(RawRecord {
                ticker: ticker.clone(),
                raw_time,
                headline,
            }),
            _ => emit(
                reporter,
                Diagnostic::MalformedRow {
                    ticker: ticker.clone(),
                    row: index,
                },
            ),
        }
    }

    debug!(count = records.len(), "Extracted listing rows");
    Ok(records)
}

/// Extract all documents and merge their rows deterministically.
///
/// Documents are processed in (ticker, origin) order regardless of the order
/// they were supplied in. Missing tables and unreadable documents are reported
/// and skipped.
#[instrument(level = "info", skip_all, fields(documents = documents.len()))]
pub fn extract_all(
    mut documents: Vec<SourceDocument>,
    table_id: &str,
    reporter: Option<&dyn Reporter>,
) -> Vec<RawRecord> {
    documents.sort_by_cached_key(|document| {
        (document.ticker.to_uppercase(), document.origin.clone())
    });

    let mut records = Vec::new();
    for document in &documents {
        match extract_document(document, table_id, reporter) {
            Ok(rows) => records.extend(rows),
            Err(ExtractError::MissingTable { ticker }) => {
                emit(reporter, Diagnostic::MissingTable { ticker })
            }
            Err(ExtractError::Fault { ticker, reason }) => {
                emit(reporter, Diagnostic::ExtractionFault { ticker, reason })
            }
        }
    }

    info!(count = records.len(), "Extracted raw records");
    records
}
