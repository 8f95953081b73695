use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadlogError {
    #[error("missing front-matter: expected a '---' delimited header block")]
    MissingFrontMatter,

    #[error("invalid front-matter: {0}")]
    InvalidFrontMatter(String),

    #[error("header field '{0}' is a nested value and cannot be rendered as a scalar")]
    NestedHeaderValue(String),

    #[error("invalid date '{0}': expected a calendar date such as 2016-03-01")]
    InvalidDate(String),

    #[error("invalid isbn '{0}': must be 10 or 13 digits")]
    InvalidIsbn(String),

    #[error("no API key configured: set api.key in readlog.yaml or READLOG_API_KEY")]
    MissingApiKey,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("metadata lookup returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReadlogError>;
