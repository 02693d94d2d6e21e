//! Single-row edit state

use std::collections::BTreeMap;

use crate::model::RowId;
use crate::model::Value;

/// Which row, if any, is in edit mode.
///
/// At most one row edits at a time. `snapshot` holds the row's fields as they
/// were when editing began, so a cancel can put them back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        id: RowId,
        snapshot: BTreeMap<String, Value>,
    },
}

impl EditState {
    /// Returns the id of the row being edited.
    pub fn editing_id(&self) -> Option<&RowId> {
        match self {
            EditState::Idle => None,
            EditState::Editing { id, .. } => Some(id),
        }
    }

    /// Returns `true` if no row is being edited.
    pub fn is_idle(&self) -> bool {
        matches!(self, EditState::Idle)
    }

    /// Returns `true` if `id` is the row being edited.
    pub fn is_editing(&self, id: &RowId) -> bool {
        self.editing_id() == Some(id)
    }
}
