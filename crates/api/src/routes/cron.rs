use axum::routing::get;
use axum::Router;

use crate::handlers::cron;
use crate::state::AppState;

/// Routes hit by the external scheduler.
///
/// ```text
/// GET /cron/auto-refresh?key=   run one refresh pass
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/cron/auto-refresh", get(cron::auto_refresh))
}
