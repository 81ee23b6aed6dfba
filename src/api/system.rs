use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthDto};

/// `GET /`
pub async fn root() -> &'static str {
    "API is running..."
}

/// Reports whether the database answers a trivial query.
///
/// # Endpoint
/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthDto>> {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Database health check failed: {e:#}");
            false
        }
    };

    let requirements = if database {
        state.store().count_requirements().await.ok()
    } else {
        None
    };

    Json(ApiResponse::success(
        "ok",
        HealthDto {
            database,
            requirements,
            uptime_seconds: state.start_time.elapsed().as_secs(),
        },
    ))
}
