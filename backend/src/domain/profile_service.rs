//! User profile, preferences and dashboard configuration.
//!
//! These records live next to the ledger in the same store but are read and
//! written one field at a time; none of them takes part in settlement except
//! `cost_per_km`, which is read when a journey ends.

use log::info;
use shared::{DashboardConfig, PreferencesResponse, Theme, UserProfile};

use super::errors::{LedgerError, LedgerResult};
use super::validation::require_text;
use crate::storage::{LedgerRepository, StorageKey};

const MAX_NAME_LENGTH: usize = 128;
const MAX_SCREEN_LENGTH: usize = 64;

#[derive(Clone)]
pub struct ProfileService {
    repository: LedgerRepository,
}

impl ProfileService {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    pub async fn get_profile(&self) -> Option<UserProfile> {
        self.repository.read_field(StorageKey::CurrentUser).await
    }

    pub async fn save_profile(&self, profile: UserProfile) -> LedgerResult<UserProfile> {
        let email = profile.email.trim().to_string();
        if !email.is_empty() && !email.contains('@') {
            return Err(LedgerError::invalid_input("Email address is not valid"));
        }

        let profile = UserProfile {
            name: require_text(&profile.name, "Name", MAX_NAME_LENGTH)?,
            email,
            vehicle: profile
                .vehicle
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        };

        self.repository
            .write_field(StorageKey::CurrentUser, &profile)
            .await?;
        info!("Saved profile for {}", profile.name);
        Ok(profile)
    }

    pub async fn get_preferences(&self) -> PreferencesResponse {
        PreferencesResponse {
            theme: self
                .repository
                .read_field(StorageKey::Theme)
                .await
                .unwrap_or_default(),
            last_screen: self.repository.read_field(StorageKey::LastScreen).await,
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> LedgerResult<Theme> {
        self.repository.write_field(StorageKey::Theme, &theme).await?;
        Ok(theme)
    }

    pub async fn set_last_screen(&self, screen: &str) -> LedgerResult<String> {
        let screen = require_text(screen, "Screen", MAX_SCREEN_LENGTH)?;
        self.repository
            .write_field(StorageKey::LastScreen, &screen)
            .await?;
        Ok(screen)
    }

    pub async fn get_config(&self) -> DashboardConfig {
        self.repository.load().await.config
    }

    /// Replace the dashboard configuration; affects future settlements only
    pub async fn update_config(&self, config: DashboardConfig) -> LedgerResult<DashboardConfig> {
        if !(config.cost_per_km >= 0.0 && config.cost_per_km.is_finite()) {
            return Err(LedgerError::invalid_input("Cost per km cannot be negative"));
        }
        if !(config.daily_net_goal >= 0.0 && config.daily_net_goal.is_finite()) {
            return Err(LedgerError::invalid_input("Daily goal cannot be negative"));
        }
        if !(0.0..=100.0).contains(&config.maintenance_alert_percent) {
            return Err(LedgerError::invalid_input(
                "Maintenance alert must be between 0 and 100 percent",
            ));
        }

        let config = self
            .repository
            .transact(|mut state| {
                state.config = config;
                let saved = state.config.clone();
                Ok::<_, LedgerError>((state, saved))
            })
            .await?;

        info!("Dashboard config updated: cost per km {:.2}", config.cost_per_km);
        Ok(config)
    }
}
