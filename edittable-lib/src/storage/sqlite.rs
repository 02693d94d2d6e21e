//! SQLite-backed persistent storage.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_trait::async_trait;

use super::Storage;
use crate::error::AdapterError;

/// Storage kept in a SQLite database file.
///
/// Survives process restarts. Uses WAL journal mode.
///
/// # Example
///
/// ```ignore
/// use edittable_lib::storage::SqliteStorage;
///
/// let storage = SqliteStorage::open("tables.db").await?;
///
/// // In-memory database (for testing)
/// let storage = SqliteStorage::open_in_memory().await?;
/// ```
pub struct SqliteStorage {
    client: Client,
}

impl SqliteStorage {
    /// Opens the storage at `path`, creating the file and table if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, async_sqlite::Error> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory database.
    pub async fn open_in_memory() -> Result<Self, async_sqlite::Error> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), async_sqlite::Error> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS storage (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await
    }
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage").finish_non_exhaustive()
    }
}

fn storage_error(e: async_sqlite::Error) -> AdapterError {
    AdapterError::storage(e.to_string())
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AdapterError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM storage WHERE key = ?",
                    [key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await
            .map_err(storage_error)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AdapterError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO storage (key, value) VALUES (?, ?)",
                    rusqlite::params![key, value],
                )
            })
            .await
            .map(|_| ())
            .map_err(storage_error)
    }

    async fn remove(&self, key: &str) -> Result<(), AdapterError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM storage WHERE key = ?", [key]))
            .await
            .map(|_| ())
            .map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_in_memory() {
        let storage = SqliteStorage::open_in_memory().await.unwrap();
        assert_eq!(storage.get("rows").await.unwrap(), None);

        storage.set("rows", "[]".to_string()).await.unwrap();
        storage.set("rows", r#"[{"id":1}]"#.to_string()).await.unwrap();
        assert_eq!(storage.get("rows").await.unwrap().as_deref(), Some(r#"[{"id":1}]"#));

        storage.remove("rows").await.unwrap();
        assert_eq!(storage.get("rows").await.unwrap(), None);
    }
}
