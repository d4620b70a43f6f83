//! Tracked characters and the collaborator contracts used to load and
//! refresh them.
//!
//! The orchestrator only ever sees these traits; the Postgres listing and
//! the HTTP refresher live in the `db` and `api` crates respectively.

use async_trait::async_trait;
use serde::Serialize;

use crate::types::DbId;

/// A character row as seen by one refresh pass. Read-only for the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedCharacter {
    pub id: DbId,
    pub name: String,
    /// Profile page the refresher pulls data from.
    pub url: String,
    pub user_id: DbId,
}

/// Failure to obtain the character list at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Datastore unavailable: {0}")]
    Unavailable(String),

    #[error("Datastore query failed: {0}")]
    Query(String),
}

/// Failure while refreshing a single character.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to store snapshot: {0}")]
    Store(String),
}

/// Lists every character subject to periodic refresh.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// Characters in the order they should be processed.
    async fn list_characters(&self) -> Result<Vec<TrackedCharacter>, SourceError>;
}

/// Updates one character from its source page.
///
/// `Ok(false)` means the refresh ran but produced no usable update.
#[async_trait]
pub trait CharacterRefresher: Send + Sync {
    async fn refresh(&self, id: DbId, url: &str) -> Result<bool, RefreshError>;
}
