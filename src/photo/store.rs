use crate::photo::PhotoBlob;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value persistence for photo blobs.
///
/// `put` is an atomic upsert, `get` reports a missing key as `None` and
/// `delete` of a missing key succeeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, blob: &PhotoBlob) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<Option<PhotoBlob>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// SQLite-backed store. Each operation checks a connection out of the pool
/// and returns it when the guard drops, on success and error alike.
#[derive(Clone)]
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    /// Opens (creating if needed) the database file and its table.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS photos (
                key         TEXT PRIMARY KEY NOT NULL,
                media_type  TEXT NOT NULL,
                data        BLOB NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// When the entry under `key` was last written
    pub async fn stored_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query("SELECT updated_at FROM photos WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(match row {
            Some(row) => Some(row.try_get::<DateTime<Utc>, _>("updated_at")?),
            None => None,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn put(&self, key: &str, blob: &PhotoBlob) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            r#"
            INSERT INTO photos (key, media_type, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                media_type = excluded.media_type,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&blob.media_type)
        .bind(&blob.bytes)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PhotoBlob>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query("SELECT media_type, data FROM photos WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(Some(PhotoBlob {
                media_type: row.try_get("media_type")?,
                bytes: row.try_get("data")?,
            })),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM photos WHERE key = ?")
            .bind(key)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() > 0 {
            tracing::debug!("Deleted stored photo {}", key);
        }
        Ok(())
    }
}

/// In-process store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, PhotoBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, blob: &PhotoBlob) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), blob.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PhotoBlob>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(bytes: &[u8]) -> PhotoBlob {
        PhotoBlob {
            bytes: bytes.to_vec(),
            media_type: "image/jpeg".into(),
        }
    }

    async fn exercise(store: &dyn BlobStore) {
        assert_eq!(store.get("profilePic").await.unwrap(), None);

        store.put("profilePic", &blob(&[1, 2, 3, 0, 255])).await.unwrap();
        assert_eq!(
            store.get("profilePic").await.unwrap(),
            Some(blob(&[1, 2, 3, 0, 255]))
        );

        store.put("profilePic", &blob(&[9])).await.unwrap();
        assert_eq!(store.get("profilePic").await.unwrap(), Some(blob(&[9])));

        store.delete("profilePic").await.unwrap();
        assert_eq!(store.get("profilePic").await.unwrap(), None);

        // deleting again is not an error
        store.delete("profilePic").await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_contract() {
        exercise(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn sqlite_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteBlobStore::open(dir.path().join("photos.db")).await.unwrap();
        exercise(&store).await;
    }

    #[tokio::test]
    async fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photos.db");

        let store = SqliteBlobStore::open(&path).await.unwrap();
        store.put("profilePic", &blob(b"jpeg bytes")).await.unwrap();
        assert!(store.stored_at("profilePic").await.unwrap().is_some());
        store.close().await;

        let reopened = SqliteBlobStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("profilePic").await.unwrap(),
            Some(blob(b"jpeg bytes"))
        );
    }
}
