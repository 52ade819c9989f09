//! # REST API for Budget Buckets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use log::info;
use shared::UpdateBucketRequest;

use super::error_response;
use crate::AppState;

/// Routes nested under `/api/buckets`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_buckets))
        .route("/reset", post(reset_all_buckets))
        .route("/:id", put(update_bucket))
        .route("/:id/reset", post(reset_bucket))
}

pub async fn list_buckets(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/buckets");
    Json(state.budget_service.list_buckets().await)
}

pub async fn update_bucket(
    State(state): State<AppState>,
    Path(bucket_id): Path<String>,
    Json(request): Json<UpdateBucketRequest>,
) -> impl IntoResponse {
    info!("PUT /api/buckets/{} - request: {:?}", bucket_id, request);

    match state.budget_service.update_bucket(&bucket_id, request).await {
        Ok(bucket) => (StatusCode::OK, Json(bucket)).into_response(),
        Err(e) => error_response("update bucket", e),
    }
}

/// Zero one bucket's accumulated amount
pub async fn reset_bucket(
    State(state): State<AppState>,
    Path(bucket_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/buckets/{}/reset", bucket_id);

    match state.budget_service.reset_bucket(&bucket_id).await {
        Ok(buckets) => (StatusCode::OK, Json(buckets)).into_response(),
        Err(e) => error_response("reset bucket", e),
    }
}

pub async fn reset_all_buckets(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/buckets/reset");

    match state.budget_service.reset_all().await {
        Ok(buckets) => (StatusCode::OK, Json(buckets)).into_response(),
        Err(e) => error_response("reset buckets", e),
    }
}
