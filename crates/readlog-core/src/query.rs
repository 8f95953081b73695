use crate::error::{Result, ReadlogError};
use crate::record::{Header, AUTHOR_NAME, ISBN13, TITLE};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// A metadata lookup derived from a record header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataQuery {
    /// Exact lookup by a normalized ISBN.
    Isbn { isbn: String },
    /// Free-text search. `combined` searches title and author together.
    Search { terms: Vec<String>, combined: bool },
}

static ISBN_RE: OnceLock<Regex> = OnceLock::new();

fn isbn_re() -> &'static Regex {
    ISBN_RE.get_or_init(|| Regex::new(r"^(?:\d{13}|\d{9}[\dX])$").unwrap())
}

/// Strip separators and validate an ISBN-10 or ISBN-13.
pub fn normalize_isbn(raw: &str) -> Result<String> {
    let isbn: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if !isbn_re().is_match(&isbn) {
        return Err(ReadlogError::InvalidIsbn(raw.to_string()));
    }
    Ok(isbn)
}

impl MetadataQuery {
    /// Pick the lookup for `header`: an ISBN lookup when `isbn13` is set,
    /// otherwise a search on `title` plus `author_name`.
    pub fn from_header(header: &Header) -> Result<Self> {
        if let Some(raw) = header.text(ISBN13) {
            return Ok(Self::Isbn {
                isbn: normalize_isbn(&raw)?,
            });
        }
        Ok(Self::search(
            header.text(TITLE).as_deref().unwrap_or(""),
            header.text(AUTHOR_NAME).as_deref(),
        ))
    }

    pub fn search(title: &str, author: Option<&str>) -> Self {
        let mut terms: Vec<String> = title.split_whitespace().map(str::to_string).collect();
        let combined = author.is_some();
        if let Some(author) = author {
            terms.extend(author.split_whitespace().map(str::to_string));
        }
        Self::Search { terms, combined }
    }

    /// Query-string pairs for the search endpoint. Terms are joined with a
    /// space, which form encoding renders as `+`.
    pub fn search_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Isbn { .. } => Vec::new(),
            Self::Search { terms, combined } => {
                let mut params = vec![("q", terms.join(" "))];
                if *combined {
                    params.push(("i", "combined".to_string()));
                }
                params
            }
        }
    }
}

impl fmt::Display for MetadataQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isbn { isbn } => write!(f, "isbn {isbn}"),
            Self::Search { terms, .. } => write!(f, "search '{}'", terms.join(" ")),
        }
    }
}
