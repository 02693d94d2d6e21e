//! Synchronous table state and its transitions.
//!
//! Everything here runs under the controller's lock and never awaits.

use std::collections::BTreeMap;

use super::EditPolicy;
use super::EditState;
use crate::error::StateConflict;
use crate::model::Column;
use crate::model::ID_FIELD;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;
use crate::query::Page;
use crate::query::Pagination;
use crate::query::SortSpec;

#[derive(Debug, Default)]
pub(crate) struct TableState {
    pub(crate) rows: Vec<Row>,
    pub(crate) pagination: Pagination,
    pub(crate) sort: SortSpec,
    pub(crate) edit: EditState,
    next_local_id: i64,
    latest_request: u64,
    pub(crate) in_flight: usize,
}

impl TableState {
    pub(crate) fn new(pagination: Pagination, sort: SortSpec) -> Self {
        Self {
            pagination,
            sort,
            next_local_id: 1,
            ..Self::default()
        }
    }

    pub(crate) fn find(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    fn find_mut(&mut self, id: &RowId) -> Result<&mut Row, StateConflict> {
        self.rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StateConflict::row_not_found(id))
    }

    fn ensure_idle(&self) -> Result<(), StateConflict> {
        match self.edit.editing_id() {
            Some(id) => Err(StateConflict::AlreadyEditing { id: id.clone() }),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Loads
    // =========================================================================

    /// Issues a new load token. Only the latest token may apply its response.
    pub(crate) fn start_load(&mut self) -> u64 {
        self.latest_request += 1;
        self.in_flight += 1;
        self.latest_request
    }

    pub(crate) fn is_latest(&self, token: u64) -> bool {
        token == self.latest_request
    }

    pub(crate) fn apply_page(&mut self, page: Page, sort: SortSpec) {
        self.pagination = page.pagination();
        self.rows = page.items.into_iter().map(Row::hydrate).collect();
        self.sort = sort;
        self.edit = EditState::Idle;
    }

    pub(crate) fn clear_rows(&mut self) {
        self.rows.clear();
        self.edit = EditState::Idle;
    }

    // =========================================================================
    // Edit transitions
    // =========================================================================

    pub(crate) fn begin_edit(&mut self, id: &RowId, policy: EditPolicy) -> Result<(), StateConflict> {
        if self.edit.is_editing(id) {
            return Ok(());
        }

        if let Some(current) = self.edit.editing_id().cloned() {
            let current_is_new = self.find(&current).is_some_and(Row::is_new);
            if policy == EditPolicy::Reject || current_is_new {
                return Err(StateConflict::AlreadyEditing { id: current });
            }
            self.find(id).ok_or_else(|| StateConflict::row_not_found(id))?;
            self.cancel_edit(&current)?;
        }

        let row = self.find_mut(id)?;
        let snapshot = row.fields.clone();
        row.is_editing = true;
        self.edit = EditState::Editing {
            id: id.clone(),
            snapshot,
        };
        Ok(())
    }

    /// Leaves edit mode for `id`. Returns `true` if the row was discarded.
    pub(crate) fn cancel_edit(&mut self, id: &RowId) -> Result<bool, StateConflict> {
        let snapshot = match std::mem::take(&mut self.edit) {
            EditState::Editing { id: current, snapshot } if current == *id => snapshot,
            other => {
                self.edit = other;
                return Err(StateConflict::NotEditing { id: id.clone() });
            }
        };

        let row = self.find_mut(id)?;
        if row.is_new {
            self.rows.retain(|r| r.id() != id);
            return Ok(true);
        }

        row.fields = snapshot;
        row.is_editing = false;
        Ok(false)
    }

    pub(crate) fn change_field(&mut self, id: &RowId, field: &str, value: Value) -> Result<(), StateConflict> {
        let row = self.find_mut(id)?;
        row.fields.insert(field.to_string(), value);
        Ok(())
    }

    pub(crate) fn add_new_row(&mut self, columns: &[Column]) -> Result<RowId, StateConflict> {
        if self.in_flight > 0 {
            return Err(StateConflict::Loading);
        }
        self.ensure_idle()?;

        // Local ids must not collide with ids already on the page.
        let above_page = self
            .rows
            .iter()
            .filter_map(|r| r.id().as_int())
            .max()
            .map_or(1, |max| max + 1);
        let local = self.next_local_id.max(above_page);
        self.next_local_id = local + 1;
        let id = RowId::Int(local);

        let fields: BTreeMap<String, Value> = columns
            .iter()
            .filter(|c| !c.field.is_empty() && c.field != ID_FIELD)
            .map(|c| (c.field.clone(), c.column_type.default_value()))
            .collect();

        self.rows.push(Row::draft(id.clone(), fields.clone()));
        self.edit = EditState::Editing {
            id: id.clone(),
            snapshot: fields,
        };
        Ok(id)
    }

    /// Drops an unsaved row. Returns `false` if `id` is not an unsaved row.
    pub(crate) fn discard_new(&mut self, id: &RowId) -> bool {
        if !self.find(id).is_some_and(Row::is_new) {
            return false;
        }
        self.rows.retain(|r| r.id() != id);
        if self.edit.is_editing(id) {
            self.edit = EditState::Idle;
        }
        true
    }

    /// Marks a row saved, adopting the backend's id if it sent one.
    pub(crate) fn finish_save(&mut self, id: &RowId, assigned: Option<RowId>) {
        if self.edit.is_editing(id) {
            self.edit = EditState::Idle;
        }
        if let Ok(row) = self.find_mut(id) {
            row.is_editing = false;
            row.is_new = false;
            if let Some(assigned) = assigned {
                row.id = assigned;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column::text("name", "Name"),
            Column::checkbox("is_active", "Active"),
            Column::select("status", "Status", ["In Progress", "Completed"]),
        ]
    }

    fn loaded(n: i64) -> TableState {
        let mut state = TableState::new(Pagination::default(), SortSpec::new());
        let items = (1..=n)
            .map(|i| Row::new(i).with("name", format!("Item {}", i)).with("is_active", true))
            .collect();
        state.apply_page(Page::new(1, 10, n as usize, items), SortSpec::new());
        state
    }

    fn editing_rows(state: &TableState) -> usize {
        state.rows.iter().filter(|r| r.is_editing()).count()
    }

    #[test]
    fn test_add_new_row_defaults() {
        let mut state = loaded(0);
        let id = state.add_new_row(&columns()).unwrap();
        let row = state.find(&id).unwrap();

        assert!(row.is_new() && row.is_editing());
        assert_eq!(row.get("name"), Some(&Value::from("")));
        assert_eq!(row.get("is_active"), Some(&Value::Bool(false)));
        assert_eq!(row.get("status"), Some(&Value::from("In Progress")));
    }

    #[test]
    fn test_add_new_row_leaves_id_column_to_the_row_id() {
        let mut columns = columns();
        columns.insert(0, Column::display("id", "ID"));
        let mut state = loaded(0);
        let id = state.add_new_row(&columns).unwrap();
        let row = state.find(&id).unwrap();

        assert_eq!(row.get("id"), None);
        assert_eq!(row.len(), 3);
        assert!(!row.fields().contains_key("id"));
    }

    #[test]
    fn test_local_ids_skip_page_ids() {
        let mut state = loaded(3);
        let id = state.add_new_row(&columns()).unwrap();
        assert_eq!(id, RowId::Int(4));
        state.cancel_edit(&id).unwrap();
        assert_eq!(state.add_new_row(&columns()).unwrap(), RowId::Int(5));
    }

    #[test]
    fn test_second_edit_rejected() {
        let mut state = loaded(3);
        state.begin_edit(&RowId::Int(1), EditPolicy::Reject).unwrap();

        let err = state.begin_edit(&RowId::Int(2), EditPolicy::Reject).unwrap_err();
        assert_eq!(err, StateConflict::AlreadyEditing { id: RowId::Int(1) });
        assert_eq!(state.add_new_row(&columns()).unwrap_err(), err);
        assert_eq!(editing_rows(&state), 1);

        // Re-entering the same row is fine
        state.begin_edit(&RowId::Int(1), EditPolicy::Reject).unwrap();
        assert_eq!(editing_rows(&state), 1);
    }

    #[test]
    fn test_switch_policy_restores_previous() {
        let mut state = loaded(3);
        state.begin_edit(&RowId::Int(1), EditPolicy::Switch).unwrap();
        state.change_field(&RowId::Int(1), "name", "changed".into()).unwrap();

        state.begin_edit(&RowId::Int(2), EditPolicy::Switch).unwrap();
        assert_eq!(state.edit.editing_id(), Some(&RowId::Int(2)));
        assert_eq!(
            state.find(&RowId::Int(1)).unwrap().get("name"),
            Some(&Value::from("Item 1"))
        );
        assert_eq!(editing_rows(&state), 1);
    }

    #[test]
    fn test_switch_policy_keeps_unsaved_new_row() {
        let mut state = loaded(1);
        let id = state.add_new_row(&columns()).unwrap();
        let err = state.begin_edit(&RowId::Int(1), EditPolicy::Switch).unwrap_err();
        assert_eq!(err, StateConflict::AlreadyEditing { id: id.clone() });
        assert!(state.find(&id).is_some());
    }

    #[test]
    fn test_cancel_restores_every_field() {
        let mut state = loaded(2);
        let id = RowId::Int(2);
        let before = state.find(&id).unwrap().clone();

        state.begin_edit(&id, EditPolicy::Reject).unwrap();
        state.change_field(&id, "name", "Renamed".into()).unwrap();
        state.change_field(&id, "is_active", false.into()).unwrap();
        state.change_field(&id, "extra", 1i64.into()).unwrap();

        assert!(!state.cancel_edit(&id).unwrap());
        let after = state.find(&id).unwrap();
        for (field, value) in before.fields() {
            assert_eq!(after.get(field), Some(value), "field {}", field);
        }
        assert_eq!(after.len(), before.len());
        assert!(!after.is_editing());
        assert!(state.edit.is_idle());
    }

    #[test]
    fn test_cancel_new_row_removes_it() {
        let mut state = loaded(2);
        let id = state.add_new_row(&columns()).unwrap();
        assert!(state.cancel_edit(&id).unwrap());
        assert!(state.find(&id).is_none());
        assert_eq!(state.rows.len(), 2);
    }

    #[test]
    fn test_cancel_without_edit() {
        let mut state = loaded(1);
        let err = state.cancel_edit(&RowId::Int(1)).unwrap_err();
        assert_eq!(err, StateConflict::NotEditing { id: RowId::Int(1) });
    }

    #[test]
    fn test_add_while_loading() {
        let mut state = loaded(1);
        state.start_load();
        assert_eq!(state.add_new_row(&columns()).unwrap_err(), StateConflict::Loading);
    }

    #[test]
    fn test_load_tokens() {
        let mut state = loaded(0);
        let first = state.start_load();
        let second = state.start_load();
        assert!(!state.is_latest(first));
        assert!(state.is_latest(second));
    }

    #[test]
    fn test_finish_save_adopts_id() {
        let mut state = loaded(0);
        let id = state.add_new_row(&columns()).unwrap();
        state.finish_save(&id, Some(RowId::from("srv-1")));

        let row = state.find(&RowId::from("srv-1")).unwrap();
        assert!(!row.is_new() && !row.is_editing());
        assert!(state.edit.is_idle());
    }
}
