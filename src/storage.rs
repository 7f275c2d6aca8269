//! Key/value persistence slots.
//!
//! A slot holds one opaque string per key and is always overwritten wholesale.

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use time::OffsetDateTime;

use crate::error::StorageError;

#[async_trait]
pub trait Slot: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Slot backed by the `storage_slots` table.
#[derive(Clone, Debug)]
pub struct SqliteSlot {
    db: Pool<Sqlite>,
}

impl SqliteSlot {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Slot for SqliteSlot {
    #[tracing::instrument(skip(self))]
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        sqlx::query_scalar::<_, String>(
            r#"
                SELECT
                    value
                FROM storage_slots
                WHERE key = $1;
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, key = %key, "an error occurred when reading slot"))
        .map_err(|e| StorageError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    #[tracing::instrument(skip(self, value), fields(len = value.len()))]
    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
                INSERT INTO
                    storage_slots (key, value, updated_at)
                VALUES
                    ($1, $2, $3)
                ON CONFLICT (key)
                DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, key = %key, "an error occurred when writing slot"))
        .map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn memory_slot() -> SqliteSlot {
    use sqlx::sqlite::SqlitePoolOptions;

    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&db).await.unwrap();

    SqliteSlot::new(db)
}
