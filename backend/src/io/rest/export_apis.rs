//! # REST API for Data Export
//!
//! CSV download of completed journeys.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use log::{error, info};

use super::ErrorResponse;
use crate::AppState;

const EXPORT_FILE_NAME: &str = "ride-ledger-journeys.csv";

/// Routes nested under `/api/export`
pub fn router() -> Router<AppState> {
    Router::new().route("/journeys.csv", get(export_journeys_csv))
}

pub async fn export_journeys_csv(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/export/journeys.csv");

    match state.export_service.export_journeys_csv().await {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export journeys: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(ErrorResponse {
                    error: "Failed to export journeys".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_export_lists_completed_journeys() {
        let app = test_app();
        send(&app, Method::POST, "/api/journeys/start", Some(json!({ "start_km": 45750 }))).await;
        send(
            &app,
            Method::POST,
            "/api/journeys/end",
            Some(json!({ "final_km": 45800, "platform_totals": { "Uber": 120 } })),
        )
        .await;

        let (status, body) = send(&app, Method::GET, "/api/export/journeys.csv", None).await;
        assert_eq!(status, StatusCode::OK);

        let csv = body.as_str().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("journey_id,"));
        assert!(lines[1].ends_with(",120.00,0.00,22.50,97.50"));
    }
}
