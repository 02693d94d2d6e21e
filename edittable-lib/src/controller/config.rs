//! Table configuration

use crate::query::PageSize;
use crate::query::SortMode;

/// What `begin_edit` does when another row is already in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    /// Reject the request and warn.
    #[default]
    Reject,
    /// Cancel the other row's edit, restoring it, then start the new one.
    ///
    /// An unsaved new row is never discarded this way; the request is
    /// rejected instead.
    Switch,
}

/// Configuration for a [`TableController`](super::TableController).
///
/// # Example
///
/// ```
/// use edittable_lib::controller::TableConfig;
/// use edittable_lib::query::SortMode;
///
/// let config = TableConfig::default()
///     .with_sort_mode(SortMode::Single)
///     .with_page_size(25)
///     .with_auto_fetch(false);
///
/// assert_eq!(config.page_size.get(), 25);
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Single- or multi-column sorting.
    ///
    /// Default: multi
    pub sort_mode: SortMode,

    /// Rows per page when the table opens.
    ///
    /// Default: 10
    pub page_size: PageSize,

    /// Load the first page as soon as the controller opens.
    ///
    /// Default: true
    pub auto_fetch: bool,

    /// Behaviour of `begin_edit` while another row is editing.
    ///
    /// Default: reject
    pub edit_policy: EditPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::Multi,
            page_size: PageSize::DEFAULT,
            auto_fetch: true,
            edit_policy: EditPolicy::Reject,
        }
    }
}

impl TableConfig {
    /// Sets the sort mode.
    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    /// Sets the initial page size. Values outside the allowed set fall back to 10.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = PageSize::sanitize(size);
        self
    }

    /// Sets whether the first page loads on open.
    pub fn with_auto_fetch(mut self, auto_fetch: bool) -> Self {
        self.auto_fetch = auto_fetch;
        self
    }

    /// Sets the edit conflict policy.
    pub fn with_edit_policy(mut self, policy: EditPolicy) -> Self {
        self.edit_policy = policy;
        self
    }
}
