//! Repository for the `character_snapshots` table.

use mu_tracker_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::{CharacterSnapshot, CreateCharacterSnapshot};

const COLUMNS: &str = "id, character_id, http_status, content_hash, content_length, fetched_at";

pub struct CharacterSnapshotRepo;

impl CharacterSnapshotRepo {
    pub async fn insert(
        pool: &PgPool,
        input: &CreateCharacterSnapshot,
    ) -> Result<CharacterSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO character_snapshots (character_id, http_status, content_hash, content_length)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterSnapshot>(&query)
            .bind(input.character_id)
            .bind(input.http_status)
            .bind(&input.content_hash)
            .bind(input.content_length)
            .fetch_one(pool)
            .await
    }

    /// Most recent snapshot for a character, if any.
    pub async fn latest_for_character(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Option<CharacterSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM character_snapshots
             WHERE character_id = $1
             ORDER BY fetched_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, CharacterSnapshot>(&query)
            .bind(character_id)
            .fetch_optional(pool)
            .await
    }
}
