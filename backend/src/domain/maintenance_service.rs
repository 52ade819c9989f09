//! Maintenance reminder ledger.
//!
//! Items are keyed off the current odometer only; they have no relationship
//! with journeys.
//!
//! `progress = (current_km − last_km) / max(1, next_km − last_km) × 100`,
//! clamped to `[0, 100]`. An item is critical once progress is strictly above
//! the configured alert percentage (90 by default), so an item sitting exactly
//! at 90 % is not yet critical.

use log::info;
use shared::{MaintenanceItem, MaintenanceItemRequest, MaintenanceStatus};

use super::errors::{LedgerError, LedgerResult};
use super::models::generate_id;
use super::validation::{parse_non_negative, require_text};
use crate::storage::LedgerRepository;

const MAX_TITLE_LENGTH: usize = 128;

/// Due progress in percent, clamped to `[0, 100]`
pub fn progress_percent(item: &MaintenanceItem, current_km: f64) -> f64 {
    let interval = (item.next_km - item.last_km).max(1.0);
    ((current_km - item.last_km) / interval * 100.0).clamp(0.0, 100.0)
}

pub fn is_critical(progress: f64, alert_percent: f64) -> bool {
    progress > alert_percent
}

pub fn status(item: &MaintenanceItem, current_km: f64, alert_percent: f64) -> MaintenanceStatus {
    let progress = progress_percent(item, current_km);
    MaintenanceStatus {
        item: item.clone(),
        progress_percent: progress,
        is_critical: is_critical(progress, alert_percent),
        km_remaining: (item.next_km - current_km).max(0.0),
    }
}

fn build_item(id: String, request: &MaintenanceItemRequest) -> LedgerResult<MaintenanceItem> {
    Ok(MaintenanceItem {
        id,
        title: require_text(&request.title, "Title", MAX_TITLE_LENGTH)?,
        last_km: parse_non_negative(&request.last_km, "Last service odometer")?,
        next_km: parse_non_negative(&request.next_km, "Next service odometer")?,
        priority: request.priority,
    })
}

#[derive(Clone)]
pub struct MaintenanceService {
    repository: LedgerRepository,
}

impl MaintenanceService {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    /// All items with progress, critical ones first, then by priority
    pub async fn list_status(&self) -> Vec<MaintenanceStatus> {
        let state = self.repository.load().await;
        let alert = state.config.maintenance_alert_percent;

        let mut statuses: Vec<MaintenanceStatus> = state
            .maintenance
            .iter()
            .map(|item| status(item, state.current_km, alert))
            .collect();
        statuses.sort_by(|a, b| {
            b.is_critical
                .cmp(&a.is_critical)
                .then(a.item.priority.cmp(&b.item.priority))
                .then(b.progress_percent.total_cmp(&a.progress_percent))
        });
        statuses
    }

    pub async fn create_item(&self, request: MaintenanceItemRequest) -> LedgerResult<MaintenanceItem> {
        let item = build_item(generate_id("maintenance"), &request)?;

        let item = self
            .repository
            .transact(|mut state| {
                state.maintenance.push(item.clone());
                Ok::<_, LedgerError>((state, item))
            })
            .await?;

        info!("Created maintenance item {} ({})", item.id, item.title);
        Ok(item)
    }

    pub async fn update_item(
        &self,
        item_id: &str,
        request: MaintenanceItemRequest,
    ) -> LedgerResult<MaintenanceItem> {
        let updated = build_item(item_id.to_string(), &request)?;

        let updated = self
            .repository
            .transact(|mut state| {
                let slot = state
                    .maintenance
                    .iter_mut()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| LedgerError::not_found("Maintenance item", item_id))?;
                *slot = updated.clone();
                Ok::<_, LedgerError>((state, updated))
            })
            .await?;

        info!("Updated maintenance item {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_item(&self, item_id: &str) -> LedgerResult<MaintenanceItem> {
        let removed = self
            .repository
            .transact(|mut state| {
                let index = state
                    .maintenance
                    .iter()
                    .position(|i| i.id == item_id)
                    .ok_or_else(|| LedgerError::not_found("Maintenance item", item_id))?;
                let removed = state.maintenance.remove(index);
                Ok::<_, LedgerError>((state, removed))
            })
            .await?;

        info!("Deleted maintenance item {}", removed.id);
        Ok(removed)
    }
}
