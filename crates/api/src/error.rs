use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use mu_tracker_core::character::SourceError;
use mu_tracker_core::error::CoreError;
use mu_tracker_core::refresh::PassError;
use serde_json::json;

/// Message returned for every rejected trigger key.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access";

/// Message returned when the datastore cannot be reached.
pub const DATABASE_UNAVAILABLE_MESSAGE: &str = "Database connection failed";

/// Message returned for every unexpected failure.
pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application-level error type for HTTP handlers.
///
/// Unauthorized requests get a bare `{"error": ...}` body; every other
/// failure uses the `{success: false, error, timestamp}` envelope. Raw
/// causes of 500s are logged and never sent to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `mu_tracker_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A refresh pass that could not run.
    #[error(transparent)]
    Pass(#[from] PassError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Core(CoreError::Unauthorized(UNAUTHORIZED_MESSAGE.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Core(CoreError::Unauthorized(msg)) => {
                return (StatusCode::UNAUTHORIZED, axum::Json(json!({ "error": msg })))
                    .into_response();
            }

            AppError::Pass(PassError::InProgress) => {
                (StatusCode::CONFLICT, PassError::InProgress.to_string())
            }
            AppError::Pass(PassError::Source(err)) => {
                tracing::error!(error = %err, "Auto-refresh could not load characters");
                let message = match err {
                    SourceError::Unavailable(_) => DATABASE_UNAVAILABLE_MESSAGE,
                    SourceError::Query(_) => "Failed to load characters",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        failure_response(status, &message)
    }
}

/// `{success: false, error, timestamp}` with the given status.
pub fn failure_response(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "success": false,
        "error": message,
        "timestamp": Utc::now(),
    });
    (status, axum::Json(body)).into_response()
}
