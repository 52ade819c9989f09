//! # REST API for Earnings Summaries

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;
use shared::PeriodGranularity;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub granularity: Option<PeriodGranularity>,
}

/// Routes nested under `/api/summary`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/today", get(get_today_summary))
        .route("/periods", get(get_period_summaries))
}

/// Today's gross, expenses, depreciation-adjusted net and goal progress
pub async fn get_today_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/summary/today");
    Json(state.summary_service.today().await)
}

/// Rollups per day, ISO week, month or year (default: day)
pub async fn get_period_summaries(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    info!("GET /api/summary/periods - query: {:?}", query);

    let granularity = query.granularity.unwrap_or(PeriodGranularity::Day);
    Json(state.summary_service.periods(granularity).await)
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_today_includes_active_journey_expenses() {
        let app = test_app();
        send(&app, Method::POST, "/api/journeys/start", Some(json!({ "start_km": 1000 }))).await;
        send(
            &app,
            Method::POST,
            "/api/journeys/expenses",
            Some(json!({ "category": "Food", "value": 15 })),
        )
        .await;

        let (status, today) = send(&app, Method::GET, "/api/summary/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(today["expenses"].as_f64(), Some(15.0));
        assert_eq!(today["gross"].as_f64(), Some(0.0));
        assert_eq!(today["goal_progress_percent"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn test_period_rollups() {
        let app = test_app();
        send(&app, Method::POST, "/api/journeys/start", Some(json!({ "start_km": 1000 }))).await;
        send(
            &app,
            Method::POST,
            "/api/journeys/end",
            Some(json!({ "final_km": 1040, "platform_totals": { "99": 80, "Private": "20" } })),
        )
        .await;

        let (status, periods) =
            send(&app, Method::GET, "/api/summary/periods?granularity=month", None).await;
        assert_eq!(status, StatusCode::OK);
        let periods = periods.as_array().unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0]["gross"].as_f64(), Some(100.0));
        assert_eq!(periods[0]["ride_count"].as_u64(), Some(2));
        assert_eq!(periods[0]["period"].as_str().unwrap().len(), 7);

        let (_, days) = send(&app, Method::GET, "/api/summary/periods", None).await;
        assert_eq!(days[0]["period"].as_str().unwrap().len(), 10);

        let (status, _) =
            send(&app, Method::GET, "/api/summary/periods?granularity=decade", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
