use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use mu_tracker_core::health::CheckStatus;
use serde::Serialize;

use crate::diagnostics::run_install_checks;
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether a refresh pass is currently running.
    pub refresh_running: bool,
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = mu_tracker_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        refresh_running: state.auto_refresh.is_running(),
    })
}

/// GET /health/install -- full installation report; 503 when any check errors.
async fn install_check(State(state): State<AppState>) -> impl IntoResponse {
    let report = run_install_checks(&state).await;
    tracing::info!(status = ?report.status, summary = %report.summary, "Installation check finished");

    let code = if report.status == CheckStatus::Error {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(report))
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/install", get(install_check))
}
