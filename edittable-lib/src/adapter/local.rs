//! Adapter over a key-value [`Storage`].

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use super::TableAdapter;
use crate::error::AdapterError;
use crate::model::Row;
use crate::model::RowId;
use crate::query::Direction;
use crate::query::Page;
use crate::query::PageRequest;
use crate::query::SortSpec;
use crate::storage::Storage;

/// Keeps a whole table as one JSON array under one storage key.
///
/// Sorting and paging happen in memory over the full array on every fetch.
/// When the key is absent and seed rows were given, the seed is written on
/// first read.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use edittable_lib::adapter::LocalAdapter;
/// use edittable_lib::storage::MemoryStorage;
///
/// let adapter = LocalAdapter::new(Arc::new(MemoryStorage::new()), "items")
///     .with_seed(sample_rows());
/// ```
#[derive(Clone)]
pub struct LocalAdapter {
    storage: Arc<dyn Storage>,
    key: String,
    seed: Option<Vec<Row>>,
}

impl LocalAdapter {
    /// Creates an adapter storing rows under `key`.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            seed: None,
        }
    }

    /// Sets rows written to storage when the key holds nothing yet.
    pub fn with_seed(mut self, rows: Vec<Row>) -> Self {
        self.seed = Some(rows.into_iter().map(Row::hydrate).collect());
        self
    }

    /// Reads every stored row, unsorted.
    ///
    /// Unreadable storage degrades to the seed rows, or to an empty table.
    pub async fn read_all(&self) -> Vec<Row> {
        let fallback = || self.seed.clone().unwrap_or_default();

        let stored = match self.storage.get(&self.key).await {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("[local] failed to read '{}': {}", self.key, e);
                return fallback();
            }
        };

        match stored {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::error!("[local] corrupt payload under '{}': {}", self.key, e);
                fallback()
            }),
            None => {
                let rows = fallback();
                if self.seed.is_some() {
                    if let Err(e) = self.write_all(&rows).await {
                        log::warn!("[local] failed to write seed rows: {}", e);
                    }
                }
                rows
            }
        }
    }

    async fn write_all(&self, rows: &[Row]) -> Result<(), AdapterError> {
        let json = serde_json::to_string(rows).map_err(|e| AdapterError::storage(e.to_string()))?;
        self.storage.set(&self.key, json).await.inspect_err(|e| {
            log::error!("[local] failed to save '{}': {}", self.key, e);
        })
    }
}

impl std::fmt::Debug for LocalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAdapter")
            .field("key", &self.key)
            .field("seed", &self.seed.as_ref().map(Vec::len))
            .finish()
    }
}

/// Orders rows by every key of `sort` in turn.
///
/// Missing and null values go last in both directions.
pub(crate) fn compare_rows(a: &Row, b: &Row, sort: &SortSpec) -> Ordering {
    for (field, direction) in sort.keys() {
        let left = a.get(field).filter(|v| !v.is_null());
        let right = b.get(field).filter(|v| !v.is_null());

        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match direction {
                Direction::Asc => x.sort_cmp(y),
                Direction::Desc => y.sort_cmp(x),
            },
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn next_free_id(rows: &[Row]) -> RowId {
    let max = rows.iter().filter_map(|r| r.id().as_int()).max().unwrap_or(0);
    RowId::Int(max + 1)
}

#[async_trait]
impl TableAdapter for LocalAdapter {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, AdapterError> {
        let mut rows = self.read_all().await;

        if !request.sort.is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, &request.sort));
        }

        let total = rows.len();
        let items = rows
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();

        Ok(Page::new(request.page, request.limit, total, items))
    }

    async fn add_row(&self, row: &Row) -> Result<Option<RowId>, AdapterError> {
        let mut rows = self.read_all().await;
        let mut stored = row.clone().hydrate();

        if rows.iter().any(|r| r.id() == stored.id()) {
            stored.set_id(next_free_id(&rows));
        }

        let id = stored.id().clone();
        rows.push(stored);
        self.write_all(&rows).await?;

        log::debug!("[local] added row {} to '{}'", id, self.key);
        Ok(Some(id))
    }

    async fn update_row(&self, row: &Row) -> Result<(), AdapterError> {
        let mut rows = self.read_all().await;
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == row.id())
            .ok_or(AdapterError::NotFound)?;
        *slot = row.clone().hydrate();
        self.write_all(&rows).await
    }

    async fn delete_row(&self, id: &RowId) -> Result<(), AdapterError> {
        let mut rows = self.read_all().await;
        rows.retain(|r| r.id() != id);
        self.write_all(&rows).await
    }

    async fn sync_row(&self, id: &RowId) -> Result<(), AdapterError> {
        log::debug!("[local] sync of row {} is a no-op", id);
        Ok(())
    }

    async fn sync_all(&self) -> Result<(), AdapterError> {
        log::debug!("[local] sync of '{}' is a no-op", self.key);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AdapterError> {
        self.write_all(&[]).await
    }
}
