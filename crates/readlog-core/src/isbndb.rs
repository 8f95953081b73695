//! ISBNdb v2 metadata source.
//!
//! Two endpoints: `book/{isbn}` for exact lookups and `books?q=...` for
//! free-text search. Both answer with the same envelope, a `data` array
//! whose first element is the book record, or an `error` message.

use crate::config::Config;
use crate::error::{Result, ReadlogError};
use crate::query::MetadataQuery;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// A flat book record from an untrusted source. Values may be nested,
/// empty, or of any JSON type.
pub type BookMetadata = serde_json::Map<String, Value>;

/// Anything that can answer a `MetadataQuery`.
///
/// `Ok(None)` means the source had nothing usable; transport and decoding
/// failures are errors.
pub trait MetadataSource: Send + Sync {
    fn lookup(&self, query: &MetadataQuery) -> Result<Option<BookMetadata>>;
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Response body. Both fields are kept loose: a `data` that is not an array,
/// or an `error` that is not a string, still decodes and just means "no
/// result".
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Envelope {
    /// Decode a response body. An empty body is `None`; malformed JSON is an
    /// error. Valid JSON that is not an object decodes to an empty envelope.
    pub fn parse(body: &str) -> Result<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(body)?;
        match value {
            Value::Object(_) => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(Some(Self::default())),
        }
    }

    /// The first data element, if `data` is an array and that element is
    /// an object.
    pub fn into_first(self) -> Option<BookMetadata> {
        let Value::Array(items) = self.data? else {
            return None;
        };
        match items.into_iter().next()? {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The reported error, if any, as display text.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// IsbnDbClient
// ---------------------------------------------------------------------------

pub struct IsbnDbClient {
    http: reqwest::blocking::Client,
    base_url: Url,
    api_key: String,
}

impl IsbnDbClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ReadlogError::InvalidConfig(format!("api.base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ReadlogError::InvalidConfig(format!(
                "api.base_url '{base_url}' cannot carry a path"
            )));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = match config.api.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::new(&config.api.base_url, config.api_key()?, timeout)
    }

    /// Build the request URL for `query`.
    pub fn request_url(&self, query: &MetadataQuery) -> Url {
        self.url_with_key(query, &self.api_key)
    }

    /// The request URL with `***` in place of the key, for logs and errors.
    fn redacted_url(&self, query: &MetadataQuery) -> String {
        self.url_with_key(query, "***").to_string()
    }

    fn url_with_key(&self, query: &MetadataQuery, key: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            // cannot_be_a_base was rejected in `new`.
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(["api", "v2", "json", key]);
                match query {
                    MetadataQuery::Isbn { isbn } => {
                        segments.extend(["book", isbn.as_str()]);
                    }
                    MetadataQuery::Search { .. } => {
                        segments.push("books");
                    }
                }
            }
        }
        if let MetadataQuery::Search { .. } = query {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.search_params() {
                pairs.append_pair(name, &value);
            }
        }
        url
    }

}

impl MetadataSource for IsbnDbClient {
    fn lookup(&self, query: &MetadataQuery) -> Result<Option<BookMetadata>> {
        let url = self.request_url(query);
        let shown = self.redacted_url(query);
        debug!(url = %shown, "metadata lookup");

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReadlogError::Status {
                status: status.as_u16(),
                url: shown,
            });
        }

        let body = resp.text()?;
        let Some(envelope) = Envelope::parse(&body)? else {
            debug!(%query, "empty response body");
            return Ok(None);
        };
        if let Some(message) = envelope.error_message() {
            warn!(%query, "metadata source reported: {message}");
        }
        Ok(envelope.into_first())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
