//! Local state conflicts

use crate::model::RowId;

/// A local operation was rejected because of the current table state.
///
/// These never reach the adapter. The controller reports them as warnings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateConflict {
    /// Another row is already in edit mode.
    #[error("Please save or cancel the current edit of row {id} first")]
    AlreadyEditing { id: RowId },

    /// A page load is still in flight.
    #[error("Table is still loading. Please wait.")]
    Loading,

    /// No row with this id is on the current page.
    #[error("Row {id} not found")]
    RowNotFound { id: RowId },

    /// The row is not in edit mode.
    #[error("Row {id} is not being edited")]
    NotEditing { id: RowId },
}

impl StateConflict {
    /// Creates a new row-not-found conflict.
    pub fn row_not_found(id: &RowId) -> Self {
        Self::RowNotFound { id: id.clone() }
    }
}
