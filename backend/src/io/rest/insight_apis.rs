//! # REST API for Shift Insights
//!
//! Both endpoints always answer 200 with some text once the journey exists;
//! when the text service is unavailable the response carries `fallback: true`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use log::info;

use super::error_response;
use crate::domain::aggregation::journey_metrics;
use crate::AppState;

/// Routes nested under `/api/insights`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/journey/:id", post(journey_insight))
        .route("/today", post(today_insight))
}

pub async fn journey_insight(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/insights/journey/{}", journey_id);

    let journey = match state.journey_service.get_journey(&journey_id).await {
        Ok(journey) => journey,
        Err(e) => return error_response("summarize journey", e),
    };

    let insight = state
        .insight_service
        .summarize(&journey_metrics(&journey))
        .await;
    (StatusCode::OK, Json(insight)).into_response()
}

pub async fn today_insight(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/insights/today");

    let metrics = state.summary_service.today_metrics().await;
    Json(state.insight_service.summarize(&metrics).await)
}
