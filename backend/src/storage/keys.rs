//! # Storage Schema
//!
//! Every persisted field of the ledger has exactly one [`StorageKey`]. Values
//! are written as a versioned JSON envelope:
//!
//! ```json
//! { "version": 1, "data": { ... } }
//! ```
//!
//! Records written before the envelope existed (bare JSON) are still accepted
//! on read and are rewritten in the envelope format on the next save.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Current version of the envelope format
pub const SCHEMA_VERSION: u32 = 1;

/// Named fields of the persisted ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    CurrentUser,
    ActiveJourney,
    JourneyHistory,
    MaintenanceItems,
    Odometer,
    BudgetBuckets,
    DashboardConfig,
    Theme,
    LastScreen,
}

impl StorageKey {
    pub const ALL: [StorageKey; 9] = [
        StorageKey::CurrentUser,
        StorageKey::ActiveJourney,
        StorageKey::JourneyHistory,
        StorageKey::MaintenanceItems,
        StorageKey::Odometer,
        StorageKey::BudgetBuckets,
        StorageKey::DashboardConfig,
        StorageKey::Theme,
        StorageKey::LastScreen,
    ];

    /// The string key used in the underlying store
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::CurrentUser => "ride_ledger.current_user",
            StorageKey::ActiveJourney => "ride_ledger.active_journey",
            StorageKey::JourneyHistory => "ride_ledger.journey_history",
            StorageKey::MaintenanceItems => "ride_ledger.maintenance_items",
            StorageKey::Odometer => "ride_ledger.odometer",
            StorageKey::BudgetBuckets => "ride_ledger.budget_buckets",
            StorageKey::DashboardConfig => "ride_ledger.dashboard_config",
            StorageKey::Theme => "ride_ledger.theme",
            StorageKey::LastScreen => "ride_ledger.last_screen",
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Serialize `value` inside the versioned envelope
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        data: value,
    })
    .context("Failed to serialize storage record")
}

/// Decode a stored record, accepting both the envelope and bare legacy JSON
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let json: serde_json::Value =
        serde_json::from_str(raw).context("Stored record is not valid JSON")?;

    let is_envelope = json
        .as_object()
        .map(|obj| obj.len() == 2 && obj.contains_key("version") && obj.contains_key("data"))
        .unwrap_or(false);

    if is_envelope {
        let envelope: Envelope<T> =
            serde_json::from_value(json).context("Stored record has an unexpected shape")?;
        if envelope.version > SCHEMA_VERSION {
            anyhow::bail!(
                "Stored record version {} is newer than supported version {}",
                envelope.version,
                SCHEMA_VERSION
            );
        }
        Ok(envelope.data)
    } else {
        serde_json::from_value(json).context("Stored legacy record has an unexpected shape")
    }
}
