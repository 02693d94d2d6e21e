//! Persistence adapters
//!
//! The controller reaches its backend only through [`TableAdapter`]. Two
//! implementations ship with the crate:
//!
//! - [`RemoteAdapter`] talks to a REST endpoint over HTTP.
//! - [`LocalAdapter`] keeps the whole table in a [`Storage`](crate::storage::Storage)
//!   and sorts and pages in memory.

mod local;
mod remote;

pub use local::*;
pub use remote::*;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::model::Row;
use crate::model::RowId;
use crate::query::Page;
use crate::query::PageRequest;

/// A persistence backend for one table.
///
/// Every method reports failure through its `Result`; the controller never
/// retries.
#[async_trait]
pub trait TableAdapter: Send + Sync {
    /// Fetches one page of rows, sorted by `request.sort`.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, AdapterError>;

    /// Inserts a new row.
    ///
    /// Returns the id the backend assigned, if it reports one.
    async fn add_row(&self, row: &Row) -> Result<Option<RowId>, AdapterError>;

    /// Replaces an existing row.
    async fn update_row(&self, row: &Row) -> Result<(), AdapterError>;

    /// Deletes a row.
    async fn delete_row(&self, id: &RowId) -> Result<(), AdapterError>;

    /// Asks the backend to synchronise one row with its upstream.
    async fn sync_row(&self, _id: &RowId) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("sync_row"))
    }

    /// Asks the backend to synchronise every row with its upstream.
    async fn sync_all(&self) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("sync_all"))
    }

    /// Deletes every row.
    async fn delete_all(&self) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("delete_all"))
    }
}
