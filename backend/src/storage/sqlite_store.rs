//! # SQLite Store
//!
//! [`KeyValueStore`] backed by a single `key_values` table. Selected with
//! `storage_backend: sqlite` in the configuration.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::sync::Arc;

use super::traits::KeyValueStore;

/// SqliteStore manages the key/value table
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))?;

        Self::setup_schema(&pool).await?;
        info!("Opened SQLite store at {}", path.display());

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS key_values (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create key_values table")?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM key_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO key_values (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM key_values WHERE key = ?")
            .bind(key)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteStore::open(temp_dir.path().join("ledger.db"))
            .await
            .expect("Failed to create test database");
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_set_and_get_value() {
        let (store, _temp_dir) = setup_test().await;

        store.set("ride_ledger.odometer", "45800").await.expect("Failed to set value");

        let result = store.get("ride_ledger.odometer").await.expect("Failed to get value");
        assert_eq!(result.as_deref(), Some("45800"));
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let (store, _temp_dir) = setup_test().await;

        store.set("same_key", "initial").await.unwrap();
        store.set("same_key", "updated").await.unwrap();

        assert_eq!(store.get("same_key").await.unwrap().as_deref(), Some("updated"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM key_values")
            .fetch_one(&*store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_remove_value() {
        let (store, _temp_dir) = setup_test().await;

        store.set("key_to_delete", "value").await.unwrap();
        assert!(store.remove("key_to_delete").await.unwrap());
        assert!(!store.remove("key_to_delete").await.unwrap());
        assert!(store.get("key_to_delete").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("ledger.db");

        {
            let store = SqliteStore::open(&db_path).await.unwrap();
            store.set("theme", "\"dark\"").await.unwrap();
        }

        let reopened = SqliteStore::open(&db_path).await.unwrap();
        assert_eq!(reopened.get("theme").await.unwrap().as_deref(), Some("\"dark\""));
    }
}
