use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Why a document could not be retrieved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.cause == FetchCause::Timeout
    }
}

/// Whole-page failures; a page that raises one yields no records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Reason a single container or link candidate produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemSkipped {
    #[error("no usable title")]
    MissingTitle,
    #[error("no anchor with an href")]
    MissingLink,
    #[error("href `{0}` cannot be resolved")]
    UnresolvableLink(String),
    #[error("href `{0}` has no article keyword")]
    NoKeyword(String),
    #[error("link text too short ({0} chars)")]
    TitleTooShort(usize),
}
