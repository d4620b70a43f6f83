use axum::routing::get;
use axum::Router;

use crate::handlers::logs;
use crate::state::AppState;

/// Diagnostic log viewer.
///
/// ```text
/// GET /logs/tail?key=&lines=   last N lines of the service log
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/logs/tail", get(logs::tail))
}
