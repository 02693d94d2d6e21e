//! Table state controller
//!
//! [`TableController`] owns the rows of the current page, the pagination
//! cursor, the sort keys and the single-row edit state. Presentation code
//! reads state through accessors and sends user intents through the
//! operation methods; persistence goes through a
//! [`TableAdapter`](crate::adapter::TableAdapter).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use edittable_lib::adapter::LocalAdapter;
//! use edittable_lib::controller::{TableConfig, TableController};
//! use edittable_lib::model::Column;
//! use edittable_lib::storage::MemoryStorage;
//!
//! let adapter = LocalAdapter::new(Arc::new(MemoryStorage::new()), "items");
//! let columns = vec![Column::text("name", "Name"), Column::checkbox("done", "Done")];
//! let table = TableController::open(adapter, columns, TableConfig::default()).await;
//!
//! let id = table.add_new_row()?;
//! table.change_field(&id, "name", "Widget")?;
//! table.save(&id).await?;
//! ```

mod config;
mod edit;
mod state;

pub use config::*;
pub use edit::*;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::adapter::TableAdapter;
use crate::error::Error;
use crate::error::StateConflict;
use crate::model::Column;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;
use crate::notify::LogNotifier;
use crate::notify::Notifier;
use crate::notify::Severity;
use crate::query::Direction;
use crate::query::PageRequest;
use crate::query::PageSize;
use crate::query::Pagination;
use crate::query::SortSpec;
use crate::query::last_page;
use state::TableState;

/// Result of a page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was applied to the table.
    Loaded(Pagination),
    /// A newer load was issued while this one was in flight; its response
    /// was dropped.
    Stale,
    /// Nothing was requested (e.g. a click on a non-sortable column).
    Unchanged,
}

/// Controller for one editable, paginated, sortable table.
///
/// Cheap to clone (uses `Arc` internally). All methods take `&self`; the
/// state lock is never held across an adapter call, so loads may overlap.
/// Overlapping loads are fenced: only the most recently issued one applies.
#[derive(Clone)]
pub struct TableController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    adapter: Arc<dyn TableAdapter>,
    columns: Vec<Column>,
    config: TableConfig,
    notifier: Arc<dyn Notifier>,
    state: Mutex<TableState>,
}

/// Decrements the in-flight count when a load finishes or is dropped.
struct InFlight<'a> {
    inner: &'a ControllerInner,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl ControllerInner {
    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TableController {
    /// Creates a controller without loading anything.
    ///
    /// Notifications go to the `log` facade until
    /// [`with_notifier`](Self::with_notifier) replaces it.
    pub fn new(adapter: impl TableAdapter + 'static, columns: Vec<Column>, config: TableConfig) -> Self {
        Self::with_notifier(adapter, columns, config, Arc::new(LogNotifier))
    }

    /// Creates a controller that reports to `notifier`.
    pub fn with_notifier(
        adapter: impl TableAdapter + 'static,
        columns: Vec<Column>,
        config: TableConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let sort = columns
            .iter()
            .filter_map(|c| c.default_sort.map(|d| (c.field.clone(), d)))
            .fold(SortSpec::new(), |sort, (field, d)| sort.then(field, d));
        let pagination = Pagination {
            limit: config.page_size.get(),
            ..Pagination::default()
        };

        Self {
            inner: Arc::new(ControllerInner {
                adapter: Arc::new(adapter),
                columns,
                config,
                notifier,
                state: Mutex::new(TableState::new(pagination, sort)),
            }),
        }
    }

    /// Creates a controller and, if `auto_fetch` is set, loads the first page.
    ///
    /// A failed first load leaves the table empty and is reported through
    /// the notifier.
    pub async fn open(adapter: impl TableAdapter + 'static, columns: Vec<Column>, config: TableConfig) -> Self {
        let controller = Self::new(adapter, columns, config);
        controller.initial_load().await;
        controller
    }

    /// Like [`open`](Self::open), reporting to `notifier`.
    pub async fn open_with_notifier(
        adapter: impl TableAdapter + 'static,
        columns: Vec<Column>,
        config: TableConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let controller = Self::with_notifier(adapter, columns, config, notifier);
        controller.initial_load().await;
        controller
    }

    async fn initial_load(&self) {
        if !self.inner.config.auto_fetch {
            return;
        }
        let (limit, sort) = {
            let state = self.inner.lock();
            (state.pagination.limit, state.sort.clone())
        };
        // failure already reported
        let _ = self.load_page(1, limit, sort).await;
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.inner.notifier.notify(message, severity);
    }

    fn conflict(&self, conflict: StateConflict) -> Error {
        self.notify(&conflict.to_string(), Severity::Warning);
        conflict.into()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the column descriptors.
    pub fn columns(&self) -> &[Column] {
        &self.inner.columns
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    /// Returns a copy of the rows on the current page.
    pub fn rows(&self) -> Vec<Row> {
        self.inner.lock().rows.clone()
    }

    /// Returns a copy of one row.
    pub fn row(&self, id: &RowId) -> Option<Row> {
        self.inner.lock().find(id).cloned()
    }

    /// Returns the pagination cursor.
    pub fn pagination(&self) -> Pagination {
        self.inner.lock().pagination
    }

    /// Returns the current sort keys.
    pub fn sort(&self) -> SortSpec {
        self.inner.lock().sort.clone()
    }

    /// Returns the direction and 0-based priority of `field` in the sort.
    pub fn sort_indicator(&self, field: &str) -> Option<(Direction, usize)> {
        let state = self.inner.lock();
        let direction = state.sort.direction_of(field)?;
        let priority = state.sort.priority_of(field)?;
        Some((direction, priority))
    }

    /// Returns `true` while any page load is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.lock().in_flight > 0
    }

    /// Returns the id of the row in edit mode.
    pub fn editing_id(&self) -> Option<RowId> {
        self.inner.lock().edit.editing_id().cloned()
    }

    /// Returns the 1-based `(from, to, total)` of the rows on screen.
    pub fn visible_range(&self) -> (usize, usize, usize) {
        let state = self.inner.lock();
        state.pagination.visible_range(state.rows.len())
    }

    /// Serializes the rows on the current page as a pretty JSON array.
    pub fn export_json(&self) -> Result<String, Error> {
        let rows = self.rows();
        Ok(serde_json::to_string_pretty(&rows)?)
    }

    // =========================================================================
    // Loading, paging and sorting
    // =========================================================================

    /// Fetches a page and, if it is still the latest request, replaces the
    /// table with it.
    ///
    /// On failure the rows are cleared and the error is reported. A response
    /// overtaken by a newer request is dropped either way.
    pub async fn load_page(&self, page: usize, limit: usize, sort: SortSpec) -> Result<LoadOutcome, Error> {
        let token = self.inner.lock().start_load();
        let _in_flight = InFlight { inner: &self.inner };

        let request = PageRequest { page, limit, sort };
        log::debug!(
            "[table] load #{} page={} limit={} sort={:?}",
            token,
            request.page,
            request.limit,
            request.sort.keys()
        );

        let result = self.inner.adapter.fetch_page(&request).await;

        let mut state = self.inner.lock();
        if !state.is_latest(token) {
            log::debug!("[table] dropping stale load #{}", token);
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(page) => {
                state.apply_page(page, request.sort);
                Ok(LoadOutcome::Loaded(state.pagination))
            }
            Err(e) => {
                state.clear_rows();
                drop(state);
                log::error!("[table] load #{} failed: {}", token, e);
                self.notify(&format!("Failed to load data: {}", e), Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Reloads the current page with the current sort.
    pub async fn refresh(&self) -> Result<LoadOutcome, Error> {
        let (page, limit, sort) = {
            let state = self.inner.lock();
            (state.pagination.page, state.pagination.limit, state.sort.clone())
        };
        self.load_page(page, limit, sort).await
    }

    /// Loads page `n`, clamped to `[1, last_page]`.
    pub async fn go_to_page(&self, n: usize) -> Result<LoadOutcome, Error> {
        let (page, limit, sort) = {
            let state = self.inner.lock();
            (state.pagination.clamp(n), state.pagination.limit, state.sort.clone())
        };
        self.load_page(page, limit, sort).await
    }

    /// Changes the page size and reloads, keeping the current page if it
    /// still exists.
    ///
    /// Sizes outside [`PageSize::ALLOWED`] fall back to 10.
    pub async fn set_page_size(&self, n: usize) -> Result<LoadOutcome, Error> {
        let limit = PageSize::sanitize(n).get();
        let (page, sort) = {
            let state = self.inner.lock();
            let new_last = last_page(state.pagination.total, limit);
            (state.pagination.page.clamp(1, new_last), state.sort.clone())
        };
        self.load_page(page, limit, sort).await
    }

    /// Advances `field` through none → asc → desc → none and reloads.
    ///
    /// Columns marked non-sortable are ignored.
    pub async fn set_sort_field(&self, field: &str) -> Result<LoadOutcome, Error> {
        let sortable = self
            .inner
            .columns
            .iter()
            .find(|c| c.field == field)
            .is_none_or(|c| c.sortable);
        if !sortable {
            return Ok(LoadOutcome::Unchanged);
        }

        let (page, limit, sort) = {
            let mut state = self.inner.lock();
            state.sort.cycle(field, self.inner.config.sort_mode);
            (state.pagination.page, state.pagination.limit, state.sort.clone())
        };
        self.load_page(page, limit, sort).await
    }

    /// Removes every sort key and reloads.
    pub async fn clear_all_sorts(&self) -> Result<LoadOutcome, Error> {
        let (page, limit) = {
            let mut state = self.inner.lock();
            state.sort.clear();
            (state.pagination.page, state.pagination.limit)
        };
        self.load_page(page, limit, SortSpec::new()).await
    }

    // =========================================================================
    // Local edits
    // =========================================================================

    /// Puts a row in edit mode, remembering its fields for a cancel.
    ///
    /// Rejected with a warning while another row is editing, unless the
    /// config's [`EditPolicy`] says otherwise.
    pub fn begin_edit(&self, id: &RowId) -> Result<(), Error> {
        let result = self.inner.lock().begin_edit(id, self.inner.config.edit_policy);
        result.map_err(|c| self.conflict(c))
    }

    /// Leaves edit mode without saving.
    ///
    /// An unsaved new row is removed; an existing row gets its fields back.
    pub fn cancel_edit(&self, id: &RowId) -> Result<(), Error> {
        let result = self.inner.lock().cancel_edit(id);
        result.map(|_| ()).map_err(|c| self.conflict(c))
    }

    /// Cancels whichever row is editing. Returns `false` if none was.
    pub fn cancel_current_edit(&self) -> bool {
        let Some(id) = self.editing_id() else {
            return false;
        };
        let cancelled = self.inner.lock().cancel_edit(&id).is_ok();
        if cancelled {
            self.notify("Edit cancelled.", Severity::Info);
        }
        cancelled
    }

    /// Sets one field of a row. No validation or coercion is applied.
    pub fn change_field(&self, id: &RowId, field: &str, value: impl Into<Value>) -> Result<(), Error> {
        let result = self.inner.lock().change_field(id, field, value.into());
        result.map_err(|c| self.conflict(c))
    }

    /// Appends an unsaved row in edit mode, filled with column defaults.
    ///
    /// Rejected while another row is editing or a load is in flight.
    pub fn add_new_row(&self) -> Result<RowId, Error> {
        let result = self.inner.lock().add_new_row(&self.inner.columns);
        result.map_err(|c| self.conflict(c))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Saves a row, inserting it if it is new, then reloads the page.
    ///
    /// Returns the row's id after the save, which is the backend's id for an
    /// insert that reported one. On failure the row stays in edit mode with
    /// its changes.
    pub async fn save(&self, id: &RowId) -> Result<RowId, Error> {
        let row = match self.row(id) {
            Some(row) => row,
            None => return Err(self.conflict(StateConflict::row_not_found(id))),
        };

        let result = if row.is_new() {
            self.inner.adapter.add_row(&row).await
        } else {
            self.inner.adapter.update_row(&row).await.map(|()| None)
        };

        let assigned = match result {
            Ok(assigned) => assigned,
            Err(e) => {
                log::warn!("[table] save of row {} failed: {}", id, e);
                self.notify(&format!("Save failed: {}", e), Severity::Error);
                return Err(e.into());
            }
        };

        let saved_id = assigned.clone().unwrap_or_else(|| id.clone());
        self.inner.lock().finish_save(id, assigned);
        self.notify("Row saved.", Severity::Success);

        // failure already reported
        let _ = self.refresh().await;
        Ok(saved_id)
    }

    /// Saves whichever row is editing. Returns `None` if none was.
    pub async fn save_current_edit(&self) -> Result<Option<RowId>, Error> {
        match self.editing_id() {
            Some(id) => self.save(&id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Deletes a row, then reloads the page.
    ///
    /// An unsaved new row is only dropped locally.
    pub async fn delete_row(&self, id: &RowId) -> Result<(), Error> {
        if self.inner.lock().discard_new(id) {
            return Ok(());
        }

        if let Err(e) = self.inner.adapter.delete_row(id).await {
            log::warn!("[table] delete of row {} failed: {}", id, e);
            self.notify(&format!("Delete failed: {}", e), Severity::Error);
            return Err(e.into());
        }

        self.notify("Row deleted.", Severity::Success);
        // failure already reported
        let _ = self.refresh().await;
        Ok(())
    }

    /// Deletes every row in the backend and reloads the first page.
    pub async fn delete_all(&self) -> Result<(), Error> {
        if let Err(e) = self.inner.adapter.delete_all().await {
            self.notify(&format!("Delete all failed: {}", e), Severity::Error);
            return Err(e.into());
        }

        let (limit, sort) = {
            let state = self.inner.lock();
            (state.pagination.limit, state.sort.clone())
        };
        // failure already reported
        let _ = self.load_page(1, limit, sort).await;
        Ok(())
    }

    /// Asks the backend to synchronise one row.
    pub async fn sync_row(&self, id: &RowId) -> Result<(), Error> {
        self.inner.adapter.sync_row(id).await.map_err(|e| {
            self.notify(&format!("Sync failed: {}", e), Severity::Error);
            e.into()
        })
    }

    /// Asks the backend to synchronise every row.
    pub async fn sync_all(&self) -> Result<(), Error> {
        self.inner.adapter.sync_all().await.map_err(|e| {
            self.notify(&format!("Sync failed: {}", e), Severity::Error);
            e.into()
        })
    }
}

impl std::fmt::Debug for TableController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("TableController")
            .field("columns", &self.inner.columns.len())
            .field("rows", &state.rows.len())
            .field("pagination", &state.pagination)
            .field("sort", &state.sort)
            .field("edit", &state.edit.editing_id())
            .finish()
    }
}
