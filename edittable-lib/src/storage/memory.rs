//! In-memory storage using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::Storage;
use crate::error::AdapterError;

/// Storage backed by a concurrent hash map.
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: DashMap<String, String>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no key is set.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AdapterError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AdapterError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AdapterError> {
        self.store.remove(key);
        Ok(())
    }
}
