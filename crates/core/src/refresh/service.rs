//! One complete auto-refresh: lock, list, pass, activity log.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::audit::{categories, AuditEvent, AuditSink, Trigger, AUTO_REFRESH_TITLE};
use crate::character::{CharacterRefresher, CharacterSource, SourceError};
use crate::refresh::lock::RunLock;
use crate::refresh::orchestrator::{run_pass, PassLimits};
use crate::refresh::pacing::{IntervalPacer, DEFAULT_PACING};
use crate::refresh::summary::RunSummary;

/// Default ceiling on a single pass.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(300);

/// Grace period on top of the deadline before a lock counts as stale.
const STALE_LOCK_GRACE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    /// Minimum spacing between refresh calls.
    pub pacing: Duration,
    /// Ceiling on a single pass.
    pub deadline: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl RefreshSettings {
    pub fn stale_lock_after(&self) -> Duration {
        self.deadline + STALE_LOCK_GRACE
    }
}

/// Failures that prevent a pass from running at all.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("Refresh already in progress")]
    InProgress,

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Runs auto-refresh passes against the configured collaborators.
///
/// Cheap to share behind an `Arc`; all passes go through the same
/// [`RunLock`].
pub struct AutoRefresh {
    source: Arc<dyn CharacterSource>,
    refresher: Arc<dyn CharacterRefresher>,
    audit: Option<Arc<dyn AuditSink>>,
    lock: Arc<RunLock>,
    settings: RefreshSettings,
    shutdown: CancellationToken,
}

impl AutoRefresh {
    pub fn new(
        source: Arc<dyn CharacterSource>,
        refresher: Arc<dyn CharacterRefresher>,
        audit: Option<Arc<dyn AuditSink>>,
        settings: RefreshSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            refresher,
            audit,
            lock: RunLock::new(settings.stale_lock_after()),
            settings,
            shutdown,
        }
    }

    /// Whether a pass is currently running.
    pub fn is_running(&self) -> bool {
        self.lock.is_held()
    }

    /// Run one pass.
    ///
    /// Nothing is refreshed if another pass holds the lock or the character
    /// list cannot be loaded. An empty list returns immediately without an
    /// activity log entry.
    pub async fn run(&self, trigger: &Trigger) -> Result<RunSummary, PassError> {
        let guard = self.lock.try_acquire().ok_or(PassError::InProgress)?;
        tracing::info!(run_id = guard.run_id(), trigger = %trigger.source, "Auto-refresh started");

        let characters = self.source.list_characters().await?;
        if characters.is_empty() {
            tracing::info!("No characters to update");
            return Ok(RunSummary::empty());
        }

        let limits = PassLimits::with_deadline(
            Instant::now() + self.settings.deadline,
            self.shutdown.child_token(),
        );
        let mut pacer = IntervalPacer::new(self.settings.pacing);
        let summary = run_pass(&characters, self.refresher.as_ref(), &mut pacer, &limits).await;

        self.record_activity(&summary, trigger).await;
        Ok(summary)
    }

    async fn record_activity(&self, summary: &RunSummary, trigger: &Trigger) {
        let Some(audit) = &self.audit else {
            return;
        };

        let event = AuditEvent {
            category: categories::SYSTEM.to_string(),
            title: AUTO_REFRESH_TITLE.to_string(),
            detail: activity_detail(summary),
            trigger_source: Some(trigger.source.to_string()),
            source_address: trigger.address.clone(),
        };

        if let Err(e) = audit.record(event).await {
            tracing::warn!(error = %e, "Failed to record auto-refresh activity");
        }
    }
}

/// Human-readable activity log line for a finished pass.
pub fn activity_detail(summary: &RunSummary) -> String {
    format!(
        "Updated {}/{} characters ({:.1}% success)",
        summary.updated, summary.total, summary.success_rate
    )
}
