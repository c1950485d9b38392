// Error types for the instafeed client.
// Covers transport failures, API envelope errors, cache errors and accessor errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstafeedError {
    #[error("{error_type} ({code}): {message}")]
    Protocol {
        error_type: String,
        code: i64,
        message: String,
    },

    #[error("Cannot process query: {0}")]
    CannotProcess(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("Empty response body")]
    EmptyBody,

    #[error("Invalid path segment {0:?}")]
    InvalidSegment(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache is disabled")]
    CacheDisabled,

    #[error("No user found matching {0:?}")]
    UserNotFound(String),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InstafeedError {
    /// Whether this error came from the upstream API rather than from the client.
    pub fn is_protocol(&self) -> bool {
        matches!(self, InstafeedError::Protocol { .. })
    }
}

pub type Result<T> = std::result::Result<T, InstafeedError>;
