use crate::enrich::{process, Outcome};
use crate::error::Result;
use crate::io;
use crate::isbndb::MetadataSource;
use crate::record::{ContentRecord, ISBN13, TITLE, UPDATED_AT};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Whether the file on disk was rewritten.
    pub written: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn count(&self, label: &str) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome.label() == label)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Enrich one file in place. With `dry_run`, nothing is written.
pub fn enrich_file(
    path: &Path,
    source: &dyn MetadataSource,
    today: NaiveDate,
    dry_run: bool,
) -> Result<FileReport> {
    let raw = std::fs::read_to_string(path)?;
    let processed = process(&raw, source, today)?;
    let written = !dry_run && processed.output != raw;
    if written {
        io::atomic_write(path, processed.output.as_bytes())?;
    }
    Ok(FileReport {
        path: path.to_path_buf(),
        outcome: processed.outcome,
        written,
    })
}

/// Enrich every file in `paths`, one after another. A failing file is
/// recorded and the rest still run.
pub fn enrich_all(
    paths: &[PathBuf],
    source: &dyn MetadataSource,
    today: NaiveDate,
    dry_run: bool,
) -> BatchReport {
    let mut report = BatchReport::default();
    for path in paths {
        match enrich_file(path, source, today, dry_run) {
            Ok(file) => report.files.push(file),
            Err(e) => {
                warn!(path = %path.display(), "enrichment failed: {e}");
                report.failures.push(FileFailure {
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RecordStatus {
    pub path: PathBuf,
    pub title: Option<String>,
    pub isbn13: Option<String>,
    pub updated_at: Option<String>,
}

impl RecordStatus {
    pub fn is_enriched(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Read a record's header without touching the network.
pub fn inspect_file(path: &Path) -> Result<RecordStatus> {
    let raw = std::fs::read_to_string(path)?;
    let record = ContentRecord::parse(&raw)?;
    Ok(RecordStatus {
        path: path.to_path_buf(),
        title: record.header.text(TITLE),
        isbn13: record.header.text(ISBN13),
        updated_at: record
            .header
            .text(UPDATED_AT)
            .filter(|_| record.header.is_set(UPDATED_AT)),
    })
}
