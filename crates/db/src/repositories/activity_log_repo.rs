//! Repository for the `activity_log` table.

use sqlx::PgPool;

use crate::models::activity_log::{ActivityLog, CreateActivityLog};

const COLUMNS: &str = "id, category, title, detail, trigger_source, source_address, created_at";

pub struct ActivityLogRepo;

impl ActivityLogRepo {
    pub async fn insert(pool: &PgPool, input: &CreateActivityLog) -> Result<ActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_log (category, title, detail, trigger_source, source_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(&input.category)
            .bind(&input.title)
            .bind(&input.detail)
            .bind(&input.trigger_source)
            .bind(&input.source_address)
            .fetch_one(pool)
            .await
    }

    /// Newest entries first, capped at 500.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(limit.clamp(1, 500))
            .fetch_all(pool)
            .await
    }
}
