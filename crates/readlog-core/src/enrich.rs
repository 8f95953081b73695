//! Per-record enrichment: parse, decide, look up, merge, render.
//!
//! Every call is self-contained. The metadata source and the current date
//! are parameters, so records can be processed in any order or in parallel.

use crate::error::Result;
use crate::isbndb::MetadataSource;
use crate::merge::{merge_metadata, FieldChange};
use crate::query::MetadataQuery;
use crate::record::{ContentRecord, ISBN13, TITLE, UPDATED_AT};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The header already carries a non-empty, non-false `updated_at`.
    AlreadyEnriched,
    /// The metadata source had nothing for this record.
    NotFound { query: MetadataQuery },
    Enriched {
        query: MetadataQuery,
        added: Vec<FieldChange>,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyEnriched => "skipped",
            Self::NotFound { .. } => "not found",
            Self::Enriched { .. } => "enriched",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub outcome: Outcome,
    /// Text to store. Identical to the input unless the record was enriched.
    pub output: String,
}

impl Processed {
    fn unchanged(raw: &str, outcome: Outcome) -> Self {
        Self {
            outcome,
            output: raw.to_string(),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self.outcome, Outcome::Enriched { .. })
    }
}

/// Enrich one content record.
///
/// Records that already have `updated_at`, or for which the source finds
/// nothing, come back byte-identical. Any error leaves the record as it was
/// on disk; the caller decides whether to continue with other records.
pub fn process(raw: &str, source: &dyn MetadataSource, today: NaiveDate) -> Result<Processed> {
    let mut record = ContentRecord::parse(raw)?;

    if record.header.is_set(UPDATED_AT) {
        return Ok(Processed::unchanged(raw, Outcome::AlreadyEnriched));
    }

    let query = MetadataQuery::from_header(&record.header)?;
    let title = record.header.text(TITLE).unwrap_or_default();
    match record.header.text(ISBN13) {
        Some(isbn) => info!("{title} ({isbn})"),
        None => info!("{title}"),
    }

    let Some(metadata) = source.lookup(&query)? else {
        return Ok(Processed::unchanged(raw, Outcome::NotFound { query }));
    };

    let merged = merge_metadata(&record.header, &metadata, today)?;
    let added = merged.changes();
    record.header = merged.header;
    let output = record.render()?;

    Ok(Processed {
        outcome: Outcome::Enriched { query, added },
        output,
    })
}
