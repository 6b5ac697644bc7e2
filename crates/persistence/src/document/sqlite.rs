//! Document stored as a single row of the `documents` table

use super::DocumentStore;
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteDocument {
    pool: SqlitePool,
    name: String,
}

impl SqliteDocument {
    pub fn new(pool: SqlitePool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocument {
    async fn read(&self) -> StorageResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM documents WHERE name = ?1")
            .bind(&self.name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("read {}: {e}", self.name)))?;

        Ok(row.map(|(body,)| body))
    }

    /// Single upsert statement, so the replacement is atomic
    async fn write(&self, body: &str) -> StorageResult<()> {
        sqlx::query(
            r#"INSERT INTO documents (name, body, updated_at)
               VALUES (?1, ?2, strftime('%s', 'now'))
               ON CONFLICT(name) DO UPDATE SET
                 body = excluded.body,
                 updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.name)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:documents/{}", self.name)
    }
}
