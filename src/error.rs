//! Error types.

use crate::domain::MessageId;

/// Failures talking to the dashboard backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid field `{field}` in response: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Reasons a draft request is refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Message {0} is not in the current inbox")]
    UnknownMessage(MessageId),

    #[error("Message {0} does not need a reply")]
    NotEligible(MessageId),

    #[error("No draft to act on")]
    NoDraft,
}

/// Clipboard sink failures. Never fatal; only logged.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write clipboard: {0}")]
    Write(String),
}
