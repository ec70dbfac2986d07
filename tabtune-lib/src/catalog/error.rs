use std::fmt::{Display, Formatter};

/// Error type for catalog lookups. No lookup is retried.
#[derive(Debug)]
pub enum CatalogError {
    Transport(String),
    Status { code: u16, message: String },
    Decode(serde_json::Error),
    InvalidUrl(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {}", err),
            Self::Status { code, message } => write!(f, "catalog returned {}: {}", code, message),
            Self::Decode(err) => write!(f, "invalid catalog response: {}", err),
            Self::InvalidUrl(url) => write!(f, "invalid video url: {}", url),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for CatalogError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}
