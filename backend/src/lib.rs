//! # Ride Ledger Backend
//!
//! Shift ledger for ride-hailing drivers: journeys, expenses, net profit
//! settlement into savings buckets, earnings rollups and maintenance
//! reminders, served over a JSON REST API.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers)
//!     ↓
//! Domain Layer (lifecycle, settlement, services)
//!     ↓
//! Storage Layer (key-value store, ledger repository)
//! ```
//!
//! The storage backend is chosen at startup; every service shares one
//! [`LedgerRepository`] so that all mutations are serialized.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{
    BudgetService, ExportService, InsightService, JourneyService, MaintenanceService,
    ProfileService, SummaryService,
};
use crate::io::rest;
use crate::storage::{FileStore, KeyValueStore, LedgerRepository, SqliteStore};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub journey_service: JourneyService,
    pub budget_service: BudgetService,
    pub summary_service: SummaryService,
    pub maintenance_service: MaintenanceService,
    pub profile_service: ProfileService,
    pub export_service: ExportService,
    pub insight_service: InsightService,
}

impl AppState {
    pub fn new(repository: LedgerRepository, insight_service: InsightService) -> Self {
        Self {
            journey_service: JourneyService::new(repository.clone()),
            budget_service: BudgetService::new(repository.clone()),
            summary_service: SummaryService::new(repository.clone()),
            maintenance_service: MaintenanceService::new(repository.clone()),
            profile_service: ProfileService::new(repository.clone()),
            export_service: ExportService::new(repository),
            insight_service,
        }
    }
}

/// Open the configured store and build every service on top of it
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_directory.display());
    let store: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.data_directory)?),
        StorageBackend::Sqlite => Arc::new(
            SqliteStore::open(config.sqlite_path())
                .await
                .context("Failed to open SQLite store")?,
        ),
    };

    info!("Setting up domain services");
    let repository = LedgerRepository::new(store);
    let insight_service = InsightService::from_config(&config.insight);

    Ok(AppState::new(repository, insight_service))
}

/// Create the Axum router with all routes configured
pub fn create_router(
    app_state: AppState,
    cors_origin: &str,
    static_directory: Option<&Path>,
) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            warn!("Ignoring invalid CORS origin '{}'", cors_origin);
            CorsLayer::new()
        }
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/journeys", rest::journey_apis::router())
        .nest("/odometer", rest::journey_apis::odometer_router())
        .nest("/buckets", rest::budget_apis::router())
        .nest("/maintenance", rest::maintenance_apis::router())
        .nest("/summary", rest::summary_apis::router())
        .nest("/insights", rest::insight_apis::router())
        .nest("/export", rest::export_apis::router())
        .nest("/logs", rest::logging_apis::router())
        .merge(rest::profile_apis::router());

    let router = Router::new().nest("/api", api_routes);
    let router = match static_directory {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::send;
    use axum::http::StatusCode;
    use tempfile::TempDir;

    fn config_for(temp_dir: &TempDir, backend: StorageBackend) -> AppConfig {
        AppConfig {
            data_directory: temp_dir.path().join("ledger"),
            storage_backend: backend,
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_state_survives_restart_with_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir, StorageBackend::File);

        let state = initialize_backend(&config).await.unwrap();
        state
            .journey_service
            .start_journey(shared::StartJourneyRequest {
                start_km: shared::AmountInput::from(120.0),
            })
            .await
            .unwrap();

        let reopened = initialize_backend(&config).await.unwrap();
        let active = reopened.journey_service.get_active().await;
        assert_eq!(active.journey.map(|j| j.start_km), Some(120.0));
    }

    #[tokio::test]
    async fn test_router_with_sqlite_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir, StorageBackend::Sqlite);

        let state = initialize_backend(&config).await.unwrap();
        let app = create_router(state, &config.cors_origin, None);

        let (status, buckets) = send(&app, Method::GET, "/api/buckets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(buckets.as_array().map(|b| b.len()), Some(4));

        let (status, _) = send(&app, Method::GET, "/api/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
