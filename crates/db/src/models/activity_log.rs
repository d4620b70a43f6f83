//! Activity log model. Entries are immutable once written.

use mu_tracker_core::audit::AuditEvent;
use mu_tracker_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub category: String,
    pub title: String,
    pub detail: String,
    pub trigger_source: Option<String>,
    pub source_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new activity log entry.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub category: String,
    pub title: String,
    pub detail: String,
    pub trigger_source: Option<String>,
    pub source_address: Option<String>,
}

impl From<AuditEvent> for CreateActivityLog {
    fn from(e: AuditEvent) -> Self {
        Self {
            category: e.category,
            title: e.title,
            detail: e.detail,
            trigger_source: e.trigger_source,
            source_address: e.source_address,
        }
    }
}
