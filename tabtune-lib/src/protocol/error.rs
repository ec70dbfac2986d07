use std::fmt::{Display, Formatter};

/// Error type for inbound embed messages that fail validation.
#[derive(Debug)]
pub enum ProtocolError {
    UntrustedOrigin(String),
    Empty,
    Json(serde_json::Error),
    UnknownEvent(String),
    UnknownStateCode(i64),
    MalformedInfo(String),
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UntrustedOrigin(origin) => write!(f, "untrusted message origin: {}", origin),
            Self::Empty => write!(f, "empty message"),
            Self::Json(err) => write!(f, "invalid message json: {}", err),
            Self::UnknownEvent(event) => write!(f, "unknown embed event: {}", event),
            Self::UnknownStateCode(code) => write!(f, "unknown player state code: {}", code),
            Self::MalformedInfo(detail) => write!(f, "malformed event info: {}", detail),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
