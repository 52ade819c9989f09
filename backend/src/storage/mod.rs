//! # Storage Module
//!
//! Handles all data persistence for the ride ledger.
//!
//! The domain layer only ever sees [`LedgerRepository`], which turns the
//! typed [`LedgerState`](crate::domain::models::LedgerState) into named,
//! versioned records inside an opaque [`KeyValueStore`]. The store itself is
//! pluggable:
//!
//! - **FileStore**: one JSON file per key in the data directory (default)
//! - **SqliteStore**: a single `key_values` table
//! - **MemoryStore**: in-process map for tests

pub mod file_store;
pub mod keys;
pub mod ledger_repository;
pub mod memory_store;
pub mod sqlite_store;
pub mod traits;

pub use file_store::FileStore;
pub use keys::StorageKey;
pub use ledger_repository::LedgerRepository;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use traits::KeyValueStore;
