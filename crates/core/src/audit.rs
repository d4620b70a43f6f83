//! Activity log events written after a refresh pass.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

/// Known activity log categories.
pub mod categories {
    pub const SYSTEM: &str = "system";
}

/// Title used for the one entry written per completed pass.
pub const AUTO_REFRESH_TITLE: &str = "Auto Refresh";

/// What started a refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    /// The HTTP endpoint hit by an external cron job.
    Cron,
    /// The optional in-process scheduler.
    Scheduler,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Cron => f.write_str("cron"),
            TriggerSource::Scheduler => f.write_str("scheduler"),
        }
    }
}

/// Who triggered a pass and from where.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub source: TriggerSource,
    /// Caller address, when known.
    pub address: Option<String>,
}

impl Trigger {
    pub fn cron(address: Option<String>) -> Self {
        Self {
            source: TriggerSource::Cron,
            address,
        }
    }

    pub fn scheduler() -> Self {
        Self {
            source: TriggerSource::Scheduler,
            address: None,
        }
    }
}

/// A single activity log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub category: String,
    pub title: String,
    pub detail: String,
    /// What started the action (`cron`, `scheduler`), when it was not a user.
    pub trigger_source: Option<String>,
    pub source_address: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to record activity: {0}")]
pub struct AuditError(pub String);

/// Destination for activity log entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}
