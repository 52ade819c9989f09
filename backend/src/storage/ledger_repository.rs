//! # Ledger Repository
//!
//! The explicit load/save boundary between [`LedgerState`] and the
//! [`KeyValueStore`].
//!
//! - **Load never fails.** A missing record yields the built-in default, and
//!   so does a malformed one (with a warning in the log).
//! - **Save rewrites every field in full.** There is no incremental or
//!   append-only persistence.
//! - **One writer at a time.** [`LedgerRepository::transact`] holds an async
//!   lock across load, transition and save.

use anyhow::Result;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::keys::{self, StorageKey};
use super::traits::KeyValueStore;
use crate::domain::models::LedgerState;

#[derive(Clone)]
pub struct LedgerRepository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl LedgerRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read one typed field; `None` when missing, unreadable or malformed
    pub async fn read_field<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.store.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {:#}. Using default.", key.as_str(), e);
                return None;
            }
        };

        match keys::decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed record {}: {:#}", key.as_str(), e);
                None
            }
        }
    }

    /// Write one typed field inside the versioned envelope
    pub async fn write_field<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<()> {
        let raw = keys::encode(value)?;
        self.store.set(key.as_str(), &raw).await
    }

    pub async fn remove_field(&self, key: StorageKey) -> Result<bool> {
        self.store.remove(key.as_str()).await
    }

    /// Load the ledger, falling back to defaults field by field
    pub async fn load(&self) -> LedgerState {
        let defaults = LedgerState::default();

        LedgerState {
            active_journey: self.read_field(StorageKey::ActiveJourney).await,
            history: self
                .read_field(StorageKey::JourneyHistory)
                .await
                .unwrap_or(defaults.history),
            current_km: self
                .read_field(StorageKey::Odometer)
                .await
                .unwrap_or(defaults.current_km),
            buckets: self
                .read_field(StorageKey::BudgetBuckets)
                .await
                .unwrap_or(defaults.buckets),
            maintenance: self
                .read_field(StorageKey::MaintenanceItems)
                .await
                .unwrap_or(defaults.maintenance),
            config: self
                .read_field(StorageKey::DashboardConfig)
                .await
                .unwrap_or(defaults.config),
        }
    }

    /// Persist every field of the ledger
    ///
    /// The active journey slot is written last. If an earlier write fails the
    /// journey stays active and ending it can be retried; history entries are
    /// keyed by journey id so the retry does not duplicate them.
    pub async fn save(&self, state: &LedgerState) -> Result<()> {
        self.write_field(StorageKey::JourneyHistory, &state.history).await?;
        self.write_field(StorageKey::Odometer, &state.current_km).await?;
        self.write_field(StorageKey::MaintenanceItems, &state.maintenance).await?;
        self.write_field(StorageKey::DashboardConfig, &state.config).await?;
        self.write_field(StorageKey::BudgetBuckets, &state.buckets).await?;
        match &state.active_journey {
            Some(journey) => self.write_field(StorageKey::ActiveJourney, journey).await?,
            None => {
                self.remove_field(StorageKey::ActiveJourney).await?;
            }
        }

        debug!(
            "Saved ledger: active={}, history={}, buckets={}, maintenance={}",
            state.active_journey.is_some(),
            state.history.len(),
            state.buckets.len(),
            state.maintenance.len()
        );
        Ok(())
    }

    /// Run one load → transition → save cycle under the write lock
    ///
    /// When `transition` returns an error nothing is written.
    pub async fn transact<R, E, F>(&self, transition: F) -> std::result::Result<R, E>
    where
        F: FnOnce(LedgerState) -> std::result::Result<(LedgerState, R), E>,
        E: From<anyhow::Error>,
    {
        let _guard = self.write_lock.lock().await;
        let state = self.load().await;
        let (next, result) = transition(state)?;
        self.save(&next).await?;
        Ok(result)
    }
}
