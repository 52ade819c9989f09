//! # REST API Interface Layer
//!
//! HTTP endpoints for the ride ledger. Each `*_apis` module exposes a
//! `router()` that is nested under `/api` by [`create_router`](crate::create_router).
//!
//! Handlers only translate: they deserialize the request, call one domain
//! service and map the outcome to a status code. Domain errors map as follows:
//!
//! | Error | Status |
//! |---|---|
//! | invalid input | 422 Unprocessable Entity |
//! | illegal transition (journey already active, none active, odometer locked) | 409 Conflict |
//! | unknown id | 404 Not Found |
//! | storage failure | 500 Internal Server Error |

pub mod budget_apis;
pub mod export_apis;
pub mod insight_apis;
pub mod journey_apis;
pub mod logging_apis;
pub mod maintenance_apis;
pub mod profile_apis;
pub mod summary_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use serde::Serialize;

use crate::domain::LedgerError;

/// Body returned with every non-2xx response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn status_for(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        e if e.is_illegal_transition() => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a refused or failed operation and turn it into a JSON error response
pub fn error_response(action: &str, e: LedgerError) -> Response {
    let status = status_for(&e);
    if status.is_server_error() {
        error!("Failed to {}: {:#}", action, e);
    } else {
        warn!("Refused to {}: {}", action, e);
    }
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::domain::InsightService;
    use crate::storage::{LedgerRepository, MemoryStore};
    use crate::{create_router, AppState};

    pub fn test_app() -> Router {
        let repository = LedgerRepository::new(Arc::new(MemoryStore::new()));
        let state = AppState::new(repository, InsightService::new(None));
        create_router(state, "http://localhost:8080", None)
    }

    /// Send one request and return the status with the body parsed as JSON
    /// (or as a JSON string when it is not JSON)
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&LedgerError::invalid_input("x")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(&LedgerError::JourneyAlreadyActive), StatusCode::CONFLICT);
        assert_eq!(status_for(&LedgerError::NoActiveJourney), StatusCode::CONFLICT);
        assert_eq!(status_for(&LedgerError::OdometerLocked), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&LedgerError::not_found("Journey", "j1")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&LedgerError::Storage(anyhow::anyhow!("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
