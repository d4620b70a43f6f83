use std::sync::Arc;

use mu_tracker_core::refresh::AutoRefresh;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mu_tracker_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Refresh service shared by the cron trigger and the scheduler.
    pub auto_refresh: Arc<AutoRefresh>,
}
