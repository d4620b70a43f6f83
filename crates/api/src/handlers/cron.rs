//! Handler for the externally scheduled refresh trigger.

use axum::extract::State;
use axum::Json;
use mu_tracker_core::audit::Trigger;
use mu_tracker_core::refresh::{RefreshOutcome, RunSummary};
use mu_tracker_core::types::Timestamp;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ClientAddr, CronAuth};
use crate::state::AppState;

/// Response body of a completed (possibly partial) pass.
#[derive(Debug, Serialize)]
pub struct AutoRefreshResponse {
    pub success: bool,
    pub message: &'static str,
    pub updated: usize,
    pub errors: usize,
    pub skipped: usize,
    pub total: usize,
    pub success_rate: f64,
    /// Whole seconds the pass took.
    pub execution_time: u64,
    pub timed_out: bool,
    pub timestamp: Timestamp,
    pub details: Vec<RefreshOutcome>,
}

impl From<RunSummary> for AutoRefreshResponse {
    fn from(summary: RunSummary) -> Self {
        let message = if summary.total == 0 {
            "No characters to update"
        } else if summary.timed_out {
            "Auto-refresh stopped at deadline"
        } else if summary.skipped > 0 {
            "Auto-refresh cancelled"
        } else {
            "Auto-refresh completed"
        };

        Self {
            success: true,
            message,
            updated: summary.updated,
            errors: summary.errors,
            skipped: summary.skipped,
            total: summary.total,
            success_rate: summary.success_rate,
            execution_time: summary.execution_time_secs(),
            timed_out: summary.timed_out,
            timestamp: summary.timestamp,
            details: summary.details,
        }
    }
}

/// GET /cron/auto-refresh?key=
///
/// The pass runs on its own task so a caller that disconnects mid-pass
/// does not abandon it halfway.
pub async fn auto_refresh(
    State(state): State<AppState>,
    _auth: CronAuth,
    ClientAddr(address): ClientAddr,
) -> AppResult<Json<AutoRefreshResponse>> {
    let service = state.auto_refresh.clone();
    let trigger = Trigger::cron(address);

    let summary = tokio::spawn(async move { service.run(&trigger).await })
        .await
        .map_err(|e| AppError::InternalError(format!("Auto-refresh task failed: {e}")))??;

    tracing::info!(
        updated = summary.updated,
        errors = summary.errors,
        skipped = summary.skipped,
        total = summary.total,
        success_rate = summary.success_rate,
        "Auto-refresh finished",
    );

    Ok(Json(summary.into()))
}
