//! Top-level error type

use super::AdapterError;
use super::StateConflict;

/// Errors returned by [`TableController`](crate::TableController) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The persistence adapter failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The operation conflicts with local table state.
    #[error(transparent)]
    Conflict(#[from] StateConflict),

    /// Failed to serialize table data.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this is a local state conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns the adapter error, if this is one.
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            Self::Adapter(e) => Some(e),
            _ => None,
        }
    }
}
