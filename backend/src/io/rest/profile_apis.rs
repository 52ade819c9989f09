//! # REST API for Profile, Preferences and Dashboard Config

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use log::info;
use shared::{DashboardConfig, LastScreenRequest, ThemeRequest, UserProfile};

use super::error_response;
use crate::AppState;

/// Routes nested directly under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(save_profile))
        .route("/preferences", get(get_preferences))
        .route("/preferences/theme", put(set_theme))
        .route("/preferences/screen", put(set_last_screen))
        .route("/config", get(get_config).put(update_config))
}

/// The stored profile, or `null` before the first save
pub async fn get_profile(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/profile");
    Json(state.profile_service.get_profile().await)
}

pub async fn save_profile(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> impl IntoResponse {
    info!("PUT /api/profile");

    match state.profile_service.save_profile(profile).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("save profile", e),
    }
}

pub async fn get_preferences(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/preferences");
    Json(state.profile_service.get_preferences().await)
}

pub async fn set_theme(
    State(state): State<AppState>,
    Json(request): Json<ThemeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/preferences/theme - request: {:?}", request);

    match state.profile_service.set_theme(request.theme).await {
        Ok(theme) => (StatusCode::OK, Json(ThemeRequest { theme })).into_response(),
        Err(e) => error_response("save theme", e),
    }
}

pub async fn set_last_screen(
    State(state): State<AppState>,
    Json(request): Json<LastScreenRequest>,
) -> impl IntoResponse {
    info!("PUT /api/preferences/screen - request: {:?}", request);

    match state.profile_service.set_last_screen(&request.screen).await {
        Ok(screen) => (StatusCode::OK, Json(LastScreenRequest { screen })).into_response(),
        Err(e) => error_response("save last screen", e),
    }
}

pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/config");
    Json(state.profile_service.get_config().await)
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<DashboardConfig>,
) -> impl IntoResponse {
    info!("PUT /api/config - request: {:?}", config);

    match state.profile_service.update_config(config).await {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => error_response("update config", e),
    }
}
