//! Character and character snapshot models.

use mu_tracker_core::character::TrackedCharacter;
use mu_tracker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A character row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub url: String,
    /// `None` until the first successful refresh.
    pub last_refreshed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Character> for TrackedCharacter {
    fn from(c: Character) -> Self {
        TrackedCharacter {
            id: c.id,
            name: c.name,
            url: c.url,
            user_id: c.user_id,
        }
    }
}

/// DTO for creating a new character.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub user_id: DbId,
    pub name: String,
    pub url: String,
}

/// One fetch of a character's source page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterSnapshot {
    pub id: DbId,
    pub character_id: DbId,
    pub http_status: i16,
    /// SHA-256 hex digest of the response body.
    pub content_hash: String,
    pub content_length: i64,
    pub fetched_at: Timestamp,
}

/// DTO for inserting a snapshot.
#[derive(Debug, Clone)]
pub struct CreateCharacterSnapshot {
    pub character_id: DbId,
    pub http_status: i16,
    pub content_hash: String,
    pub content_length: i64,
}
