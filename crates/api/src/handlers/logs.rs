//! Plain-text log viewer.

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mu_tracker_core::log_tail::{self, CANDIDATE_PATHS};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::CronAuth;
use crate::state::AppState;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `lines` is kept as text so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct TailParams {
    pub lines: Option<String>,
}

impl TailParams {
    /// Requested line count, clamped. Negative values count as zero.
    pub fn line_count(&self) -> usize {
        let requested = self
            .lines
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|n| usize::try_from(n.max(0)).unwrap_or(usize::MAX));
        log_tail::clamp_lines(requested)
    }
}

/// GET /logs/tail?key=&lines=
pub async fn tail(
    State(state): State<AppState>,
    _auth: CronAuth,
    Query(params): Query<TailParams>,
) -> AppResult<Response> {
    let lines = params.line_count();
    let configured = state.config.log_file.clone();

    let result = tokio::task::spawn_blocking(move || {
        let path = log_tail::discover(configured.as_deref(), CANDIDATE_PATHS)?;
        Some(log_tail::tail(&path, lines).map_err(|e| (path, e)))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Log tail task failed: {e}")))?;

    let response = match result {
        None => (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, TEXT_PLAIN)],
            "No log file found".to_string(),
        ),
        Some(Ok(tail)) => (StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN)], tail.render()),
        Some(Err((path, e))) => {
            return Err(AppError::InternalError(format!(
                "Failed to read {}: {e}",
                path.display()
            )));
        }
    };

    Ok(response.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lines: Option<&str>) -> TailParams {
        TailParams {
            lines: lines.map(str::to_string),
        }
    }

    #[test]
    fn line_count_is_lenient() {
        assert_eq!(params(None).line_count(), log_tail::DEFAULT_LINES);
        assert_eq!(params(Some("abc")).line_count(), log_tail::DEFAULT_LINES);
        assert_eq!(params(Some("")).line_count(), log_tail::DEFAULT_LINES);
        assert_eq!(params(Some(" 25 ")).line_count(), 25);
        assert_eq!(params(Some("-5")).line_count(), 1);
        assert_eq!(params(Some("99999999")).line_count(), log_tail::MAX_LINES);
    }
}
