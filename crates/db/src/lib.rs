//! Postgres access for the MU Tracker operations service.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod adapters;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Tables the service expects to find after migrations have run.
pub const REQUIRED_TABLES: &[&str] = &["users", "characters", "character_snapshots", "activity_log"];

/// Create a connection pool from a database URL.
///
/// Connections are opened on first use, so the service can start (and
/// report the problem through its health checks) while the database is down.
pub fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)
}

/// Round-trip a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Names of the tables in the current schema.
pub async fn existing_tables(pool: &DbPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT table_name::TEXT FROM information_schema.tables
         WHERE table_schema = current_schema()
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
}

/// Number of migrations recorded as successfully applied.
///
/// Returns 0 when the migrations table does not exist yet.
pub async fn applied_migration_count(pool: &DbPool) -> Result<i64, sqlx::Error> {
    let has_table: bool = sqlx::query_scalar(
        "SELECT EXISTS (
             SELECT 1 FROM information_schema.tables
             WHERE table_schema = current_schema() AND table_name = '_sqlx_migrations'
         )",
    )
    .fetch_one(pool)
    .await?;

    if !has_table {
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
}

/// Number of migrations embedded in this build.
pub fn embedded_migration_count() -> usize {
    MIGRATOR.iter().count()
}
