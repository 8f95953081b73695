use crate::error::{Result, ReadlogError};
use crate::isbndb::BookMetadata;
use crate::record::{Header, AUTHOR_NAME, DATE, UPDATED_AT};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

pub const AUTHOR_DATA: &str = "author_data";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Result of merging a metadata record into a header.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub header: Header,
    /// Keys copied from the metadata record, in the order they were added.
    pub added: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub key: String,
    pub value: String,
}

/// Fill the gaps in `header` from `metadata`.
///
/// Existing keys are never overwritten. Empty values and nested values are
/// skipped, except that the first `author_data` entry's `name` becomes
/// `author_name` when the header has none. Afterwards `date` is normalized
/// to `YYYY-MM-DD` and `updated_at` is stamped with `today`.
///
/// `header` is untouched on error.
pub fn merge_metadata(header: &Header, metadata: &BookMetadata, today: NaiveDate) -> Result<Merged> {
    let mut merged = header.clone();
    let mut added = Vec::new();

    for (key, value) in metadata {
        if merged.contains_key(key) || is_falsy(value) {
            continue;
        }
        match value {
            Value::Object(_) => {}
            Value::Array(entries) => {
                if key == AUTHOR_DATA && !merged.contains_key(AUTHOR_NAME) {
                    if let Some(name) = first_author_name(entries) {
                        merged.insert(AUTHOR_NAME, name);
                        added.push(AUTHOR_NAME.to_string());
                    }
                }
            }
            scalar => {
                merged.insert(key, json_scalar_to_string(scalar));
                added.push(key.clone());
            }
        }
    }

    if let Some(raw) = merged.text(DATE) {
        let date = parse_date(&raw)?;
        merged.insert(DATE, date.format(DATE_FORMAT).to_string());
    }
    merged.insert(UPDATED_AT, today.format(DATE_FORMAT).to_string());

    Ok(Merged {
        header: merged,
        added,
    })
}

/// Values that carry no information: null, false, zero, and "".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn first_author_name(entries: &[Value]) -> Option<String> {
    entries
        .first()?
        .get("name")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse the date forms found in reading-log headers.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(ReadlogError::InvalidDate(raw.to_string()))
}

impl Merged {
    /// The added keys paired with their new values.
    pub fn changes(&self) -> Vec<FieldChange> {
        self.added
            .iter()
            .map(|key| FieldChange {
                key: key.clone(),
                value: self.header.text(key).unwrap_or_default(),
            })
            .collect()
    }
}
