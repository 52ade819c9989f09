//! # Storage Traits
//!
//! The persistent store is an opaque, string-keyed store of serialized JSON
//! blobs. The domain never talks to files or tables directly; it goes through
//! [`KeyValueStore`] so the backing mechanism can be swapped (files, SQLite,
//! memory for tests) without touching the ledger logic.

use anyhow::Result;
use async_trait::async_trait;

/// Trait defining the get/set/remove interface of the on-device store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the raw value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing whatever was there
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns true if a value was actually removed
    async fn remove(&self, key: &str) -> Result<bool>;
}
