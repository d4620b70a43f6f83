//! Postgres implementations of the core collaborator traits.

use async_trait::async_trait;
use mu_tracker_core::audit::{AuditError, AuditEvent, AuditSink};
use mu_tracker_core::character::{CharacterSource, SourceError, TrackedCharacter};

use crate::models::activity_log::CreateActivityLog;
use crate::repositories::{ActivityLogRepo, CharacterRepo};
use crate::DbPool;

/// Lists characters from the `characters` table.
#[derive(Clone)]
pub struct PgCharacterSource {
    pool: DbPool,
}

impl PgCharacterSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterSource for PgCharacterSource {
    async fn list_characters(&self) -> Result<Vec<TrackedCharacter>, SourceError> {
        let rows = CharacterRepo::list_all(&self.pool)
            .await
            .map_err(classify_source_error)?;
        Ok(rows.into_iter().map(TrackedCharacter::from).collect())
    }
}

/// Connection-level failures mean the datastore is unreachable; anything
/// else is a failed query against a reachable database.
fn classify_source_error(err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_) => SourceError::Unavailable(err.to_string()),
        other => SourceError::Query(other.to_string()),
    }
}

/// Writes audit events to the `activity_log` table.
#[derive(Clone)]
pub struct PgActivityLog {
    pool: DbPool,
}

impl PgActivityLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgActivityLog {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        ActivityLogRepo::insert(&self.pool, &CreateActivityLog::from(event))
            .await
            .map(|_| ())
            .map_err(|e| AuditError(e.to_string()))
    }
}
