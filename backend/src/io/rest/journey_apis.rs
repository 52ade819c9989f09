//! # REST API for Journeys
//!
//! Journey lifecycle (start, pause, expenses, end), history, and the
//! odometer reading that links consecutive journeys.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use log::info;
use shared::{AddExpenseRequest, EndJourneyRequest, SetOdometerRequest, StartJourneyRequest};

use super::error_response;
use crate::AppState;

/// Routes nested under `/api/journeys`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/active", get(get_active_journey))
        .route("/start", post(start_journey))
        .route("/pause", post(toggle_pause))
        .route("/expenses", post(add_expense))
        .route("/expenses/:id", delete(remove_expense))
        .route("/end", post(end_journey))
        .route("/history", get(get_history))
        .route("/history/:id", get(get_journey).delete(delete_history_entry))
}

/// Routes nested under `/api/odometer`
pub fn odometer_router() -> Router<AppState> {
    Router::new().route("/", get(get_odometer).put(set_odometer))
}

pub async fn get_active_journey(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/journeys/active");
    Json(state.journey_service.get_active().await)
}

pub async fn start_journey(
    State(state): State<AppState>,
    Json(request): Json<StartJourneyRequest>,
) -> impl IntoResponse {
    info!("POST /api/journeys/start - request: {:?}", request);

    match state.journey_service.start_journey(request).await {
        Ok(journey) => (StatusCode::CREATED, Json(journey)).into_response(),
        Err(e) => error_response("start journey", e),
    }
}

/// Pause the running journey, or resume it when already paused
pub async fn toggle_pause(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/journeys/pause");

    match state.journey_service.toggle_pause().await {
        Ok(journey) => (StatusCode::OK, Json(journey)).into_response(),
        Err(e) => error_response("toggle pause", e),
    }
}

pub async fn add_expense(
    State(state): State<AppState>,
    Json(request): Json<AddExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/journeys/expenses - request: {:?}", request);

    match state.journey_service.add_expense(request).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => error_response("record expense", e),
    }
}

pub async fn remove_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/journeys/expenses/{}", expense_id);

    match state.journey_service.remove_expense(&expense_id).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => error_response("remove expense", e),
    }
}

pub async fn end_journey(
    State(state): State<AppState>,
    Json(request): Json<EndJourneyRequest>,
) -> impl IntoResponse {
    info!("POST /api/journeys/end - request: {:?}", request);

    match state.journey_service.end_journey(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("end journey", e),
    }
}

pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/journeys/history");
    Json(state.journey_service.history().await)
}

pub async fn get_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/journeys/history/{}", journey_id);

    match state.journey_service.get_journey(&journey_id).await {
        Ok(journey) => (StatusCode::OK, Json(journey)).into_response(),
        Err(e) => error_response("get journey", e),
    }
}

pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/journeys/history/{}", journey_id);

    match state.journey_service.delete_history_entry(&journey_id).await {
        Ok(journey) => (StatusCode::OK, Json(journey)).into_response(),
        Err(e) => error_response("delete journey", e),
    }
}

pub async fn get_odometer(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/odometer");
    Json(state.journey_service.get_odometer().await)
}

pub async fn set_odometer(
    State(state): State<AppState>,
    Json(request): Json<SetOdometerRequest>,
) -> impl IntoResponse {
    info!("PUT /api/odometer - request: {:?}", request);

    match state.journey_service.set_odometer(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("set odometer", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn approx(value: &serde_json::Value, expected: f64) -> bool {
        value.as_f64().map_or(false, |v| (v - expected).abs() < 1e-9)
    }

    #[tokio::test]
    async fn test_full_shift_settles_and_distributes() {
        let app = test_app();

        let (status, journey) = send(
            &app,
            Method::POST,
            "/api/journeys/start",
            Some(json!({ "start_km": "45750" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(journey["status"], "active");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/journeys/expenses",
            Some(json!({ "category": "Fuel", "value": "50,00" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/journeys/end",
            Some(json!({ "final_km": 45800, "platform_totals": { "Uber": "120" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(approx(&body["settlement"]["net"], 47.5));
        assert!(approx(&body["settlement"]["depreciation"], 22.5));
        assert_eq!(body["distributed"], true);

        let amounts: Vec<f64> = body["buckets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["current_amount"].as_f64().unwrap())
            .collect();
        let expected = [11.875, 9.5, 11.875, 14.25];
        for (actual, expected) in amounts.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-9);
        }

        let (_, active) = send(&app, Method::GET, "/api/journeys/active", None).await;
        assert!(active["journey"].is_null());

        let (_, odometer) = send(&app, Method::GET, "/api/odometer", None).await;
        assert!(approx(&odometer["current_km"], 45800.0));

        let (_, history) = send(&app, Method::GET, "/api/journeys/history", None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_illegal_transitions_return_conflict() {
        let app = test_app();

        let (status, _) = send(&app, Method::POST, "/api/journeys/pause", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/journeys/end",
            Some(json!({ "final_km": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(&app, Method::POST, "/api/journeys/start", Some(json!({ "start_km": 100 }))).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/journeys/start",
            Some(json!({ "start_km": 200 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already active"));

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/odometer",
            Some(json!({ "current_km": 300 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_amount_is_unprocessable() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/journeys/start",
            Some(json!({ "start_km": "abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());

        let (_, active) = send(&app, Method::GET, "/api/journeys/active", None).await;
        assert!(active["journey"].is_null());
    }

    #[tokio::test]
    async fn test_null_platform_total_produces_no_ride() {
        let app = test_app();
        send(&app, Method::POST, "/api/journeys/start", Some(json!({ "start_km": 100 }))).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/journeys/end",
            Some(json!({ "final_km": 150, "platform_totals": { "Uber": 120, "InDrive": null } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let rides = body["journey"]["rides"].as_array().unwrap();
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0]["platform"], "Uber");
        assert!(approx(&body["settlement"]["total_gross"], 120.0));
    }

    #[tokio::test]
    async fn test_unknown_history_entry_is_not_found() {
        let app = test_app();
        let (status, _) = send(&app, Method::DELETE, "/api/journeys/history/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
