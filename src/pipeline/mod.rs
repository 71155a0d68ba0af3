//! The extraction-and-normalization pipeline.
//!
//! Stages run in batch, each consuming the whole output of the previous one:
//!
//! 1. [`extract`]: listing rows to [`RawRecord`](crate::models::RawRecord)s
//! 2. [`normalize`]: time resolution, headline cleanup, deduplication
//! 3. [`sentiment`]: polarity per headline via a [`PolarityScorer`]
//! 4. [`aggregate`]: mean polarity per (ticker, time bucket)
//!
//! Every stage takes an optional [`Reporter`] for skipped or dropped records.

pub mod aggregate;
pub mod diagnostics;
pub mod extract;
pub mod normalize;
pub mod sentiment;
pub mod time_resolver;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::models::{BucketAggregate, ScoredRecord, SourceDocument};
use aggregate::BucketWidth;
use diagnostics::Reporter;
use sentiment::{PolarityScorer, ScoringFailurePolicy};

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub reference_date: NaiveDate,
    pub news_table_id: String,
    pub bucket_width: BucketWidth,
    pub scoring_failure: ScoringFailurePolicy,
}

/// Everything a run produces for the persistence and charting collaborators.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub records: Vec<ScoredRecord>,
    pub buckets: Vec<BucketAggregate>,
}

/// Run all stages over a fixed set of documents.
///
/// No resolvable record at all is a valid, empty result. The only error that
/// can escape is a scoring failure under [`ScoringFailurePolicy::Abort`].
#[instrument(level = "info", skip_all, fields(documents = documents.len(), reference_date = %options.reference_date))]
pub fn run(
    documents: Vec<SourceDocument>,
    options: &PipelineOptions,
    scorer: &dyn PolarityScorer,
    reporter: Option<&dyn Reporter>,
) -> Result<PipelineOutput, PipelineError> {
    let raw = extract::extract_all(documents, &options.news_table_id, reporter);
    let normalized = normalize::normalize_on(raw, options.reference_date, reporter);
    let records = sentiment::score_records(normalized, scorer, options.scoring_failure, reporter)?;
    let buckets = aggregate::aggregate(&records, options.bucket_width);

    info!(
        records = records.len(),
        buckets = buckets.len(),
        "Pipeline run complete"
    );
    Ok(PipelineOutput { records, buckets })
}
