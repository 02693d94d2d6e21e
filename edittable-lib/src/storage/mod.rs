//! Key-value storage backends for the local adapter
//!
//! A [`Storage`] holds string payloads under string keys, the same contract
//! as browser local storage. [`LocalAdapter`](crate::adapter::LocalAdapter)
//! keeps a whole table as one JSON document under one key.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;

use crate::error::AdapterError;

/// A string key-value store.
///
/// # Example
///
/// ```ignore
/// use edittable_lib::storage::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// storage.set("rows", "[]".to_string()).await?;
/// assert_eq!(storage.get("rows").await?.as_deref(), Some("[]"));
/// ```
#[async_trait]
pub trait Storage: Send + Sync {
    /// Reads the payload under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, AdapterError>;

    /// Writes the payload under `key`, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<(), AdapterError>;

    /// Removes the payload under `key`.
    async fn remove(&self, key: &str) -> Result<(), AdapterError>;
}
