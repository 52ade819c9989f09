//! # REST API for Maintenance Reminders

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use log::info;
use shared::MaintenanceItemRequest;

use super::error_response;
use crate::AppState;

/// Routes nested under `/api/maintenance`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenance).post(create_item))
        .route("/:id", put(update_item).delete(delete_item))
}

/// Items with their due progress against the current odometer
pub async fn list_maintenance(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/maintenance");
    Json(state.maintenance_service.list_status().await)
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<MaintenanceItemRequest>,
) -> impl IntoResponse {
    info!("POST /api/maintenance - request: {:?}", request);

    match state.maintenance_service.create_item(request).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => error_response("create maintenance item", e),
    }
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(request): Json<MaintenanceItemRequest>,
) -> impl IntoResponse {
    info!("PUT /api/maintenance/{} - request: {:?}", item_id, request);

    match state.maintenance_service.update_item(&item_id, request).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response("update maintenance item", e),
    }
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/maintenance/{}", item_id);

    match state.maintenance_service.delete_item(&item_id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response("delete maintenance item", e),
    }
}
