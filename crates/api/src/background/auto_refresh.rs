//! In-process auto-refresh scheduler.
//!
//! Runs the same pass as `GET /cron/auto-refresh` on a fixed interval for
//! deployments without an external cron. Shares the run lock with the HTTP
//! trigger, so a tick that lands during a cron-triggered pass is skipped.

use std::sync::Arc;
use std::time::Duration;

use mu_tracker_core::audit::Trigger;
use mu_tracker_core::refresh::{AutoRefresh, PassError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Run the scheduler loop until `cancel` is triggered.
///
/// The first pass runs one full interval after startup.
pub async fn run(service: Arc<AutoRefresh>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Auto-refresh scheduler started");

    let mut interval = interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Auto-refresh scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                match service.run(&Trigger::scheduler()).await {
                    Ok(summary) => {
                        tracing::info!(
                            updated = summary.updated,
                            errors = summary.errors,
                            total = summary.total,
                            "Scheduled auto-refresh finished"
                        );
                    }
                    Err(PassError::InProgress) => {
                        tracing::debug!("Scheduled auto-refresh skipped: pass already running");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled auto-refresh failed");
                    }
                }
            }
        }
    }
}
