//! Installation health probes.
//!
//! Each probe yields one named [`CheckResult`]; [`run_install_checks`] rolls
//! them into a [`HealthReport`]. Database-dependent probes are skipped with
//! an error result when the database is unreachable, so a dead database
//! costs one connection timeout rather than three.

use std::path::PathBuf;

use mu_tracker_core::health::{check_files_readable, missing_tables, CheckResult, HealthReport};
use mu_tracker_db::DbPool;
use serde_json::json;

use crate::config::ServerConfig;
use crate::state::AppState;

pub async fn run_install_checks(state: &AppState) -> HealthReport {
    let mut checks = vec![
        ("runtime", check_runtime()),
        ("configuration", check_configuration(&state.config)),
        ("files", check_files(&state.config)),
    ];

    match mu_tracker_db::health_check(&state.pool).await {
        Ok(()) => {
            checks.push(("database", CheckResult::ok(true)));
            checks.push(("tables", check_tables(&state.pool).await));
            checks.push(("migrations", check_migrations(&state.pool).await));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Installation check: database unreachable");
            let skipped = "Skipped: database unreachable";
            checks.push(("database", CheckResult::error(false, format!("Database unreachable: {e}"))));
            checks.push(("tables", CheckResult::error(json!(null), skipped)));
            checks.push(("migrations", CheckResult::error(json!(null), skipped)));
        }
    }

    HealthReport::from_checks(checks)
}

fn check_runtime() -> CheckResult {
    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    CheckResult::ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "profile": profile,
    }))
}

fn check_configuration(config: &ServerConfig) -> CheckResult {
    if config.cron_key.is_some() {
        CheckResult::ok(json!({ "cron_key": true }))
    } else {
        CheckResult::warning(
            json!({ "cron_key": false }),
            "CRON_KEY is not set; every refresh trigger will be rejected",
        )
    }
}

fn check_files(config: &ServerConfig) -> CheckResult {
    let paths: Vec<PathBuf> = config
        .log_file
        .iter()
        .chain(config.install_check_files.iter())
        .cloned()
        .collect();
    check_files_readable(&paths)
}

async fn check_tables(pool: &DbPool) -> CheckResult {
    match mu_tracker_db::existing_tables(pool).await {
        Ok(present) => {
            let missing = missing_tables(mu_tracker_db::REQUIRED_TABLES, &present);
            if missing.is_empty() {
                CheckResult::ok(json!(mu_tracker_db::REQUIRED_TABLES))
            } else {
                CheckResult::error(
                    json!(missing),
                    format!("Missing tables: {}", missing.join(", ")),
                )
            }
        }
        Err(e) => CheckResult::error(json!(null), format!("Failed to list tables: {e}")),
    }
}

async fn check_migrations(pool: &DbPool) -> CheckResult {
    let embedded = mu_tracker_db::embedded_migration_count();
    match mu_tracker_db::applied_migration_count(pool).await {
        Ok(applied) => {
            let value = json!({ "applied": applied, "embedded": embedded });
            let pending = (embedded as i64).saturating_sub(applied);
            if pending > 0 {
                CheckResult::warning(value, format!("{pending} pending migrations"))
            } else {
                CheckResult::ok(value)
            }
        }
        Err(e) => CheckResult::error(json!(null), format!("Failed to read migrations: {e}")),
    }
}
