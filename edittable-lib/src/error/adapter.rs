//! Adapter error types

use std::time::Duration;

/// Errors reported by a persistence adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Non-success HTTP response from the remote endpoint.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Network error during a remote call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a response or a stored payload.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw body, if available.
        body: Option<String>,
    },

    /// The storage backend failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The row does not exist in the backend.
    #[error("Row not found")]
    NotFound,

    /// The adapter does not implement this operation.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),
}

impl AdapterError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error with the raw body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Creates a new storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
