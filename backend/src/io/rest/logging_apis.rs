//! Forwarding of frontend log lines into the server log.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
}

/// Routes nested under `/api/logs`
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(log_message))
}

pub async fn log_message(
    State(_app_state): State<AppState>,
    Json(request): Json<LogRequest>,
) -> Result<Json<LogResponse>, StatusCode> {
    let component = request.component.as_deref().unwrap_or("pwa");
    let message = format!("[{}] {}", component, request.message);

    match request.level.to_lowercase().as_str() {
        "debug" => debug!("{}", message),
        "warn" | "warning" => warn!("{}", message),
        "error" => error!("{}", message),
        _ => info!("{}", message),
    }

    Ok(Json(LogResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_log_forwarding() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/logs",
            Some(json!({ "level": "warn", "message": "offline", "component": "sync" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}
