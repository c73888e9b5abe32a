use axum::{extract::State, http::StatusCode};
use sea_orm::ConnectionTrait;

use crate::common::AppState;
use crate::error::{AppError, AppResult};

/// Liveness check
///
/// Returns 200 OK if the service is running.
/// This endpoint is not rate-limited and suitable for container probes.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness check
///
/// Returns 200 OK when the database answers, 503 with an error body otherwise.
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn readyz(State(state): State<AppState>) -> AppResult<StatusCode> {
    match state.db.execute_unprepared("SELECT 1").await {
        Ok(_) => Ok(StatusCode::OK),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Err(AppError::ServiceUnavailable(
                "Database unreachable".to_string(),
            ))
        }
    }
}
