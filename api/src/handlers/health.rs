use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    error::ApiResult,
    models::{DatabaseHealth, HealthResponse},
    AppState,
};

/// Health check endpoint
///
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("Health check requested");

    let (healthy, db_health) = match state.user_manager.verify_integrity().await {
        Ok(true) => (
            true,
            DatabaseHealth {
                connected: true,
                message: "Database connection successful".to_string(),
            },
        ),
        Ok(false) => (
            false,
            DatabaseHealth {
                connected: true,
                message: "Database schema incomplete".to_string(),
            },
        ),
        Err(e) => (
            false,
            DatabaseHealth {
                connected: false,
                message: format!("Database connection failed: {}", e),
            },
        ),
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        database: db_health,
    };

    Ok(Json(response))
}
