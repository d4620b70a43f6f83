use std::fs::{self, OpenOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mu_tracker_core::refresh::AutoRefresh;
use mu_tracker_db::adapters::{PgActivityLog, PgCharacterSource};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mu_tracker_api::background;
use mu_tracker_api::config::ServerConfig;
use mu_tracker_api::refresher::HttpCharacterRefresher;
use mu_tracker_api::router::{build_app_router, serve_with_shutdown};
use mu_tracker_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    // Loaded before tracing so LOG_FILE can add a file layer.
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let file_layer = config.log_file.as_ref().map(|path| {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).expect("Failed to create log directory");
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Failed to open LOG_FILE");
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Arc::new(file))
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mu_tracker_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.cron_key.is_none() {
        tracing::warn!("CRON_KEY is not set; refresh triggers and the log viewer will reject every request");
    }

    // --- Database ---
    // The pool connects lazily so the health endpoints can report a dead
    // database instead of the process refusing to start.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mu_tracker_db::create_pool(&database_url).expect("Invalid DATABASE_URL");

    match mu_tracker_db::health_check(&pool).await {
        Ok(()) => {
            tracing::info!("Database health check passed");
            match mu_tracker_db::run_migrations(&pool).await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::error!(error = %e, "Failed to run database migrations"),
            }
        }
        Err(e) => tracing::warn!(error = %e, "Database unreachable at startup"),
    }

    // --- Refresh service ---
    let shutdown = CancellationToken::new();

    let refresher = HttpCharacterRefresher::new(
        pool.clone(),
        Duration::from_secs(config.fetch_timeout_secs),
    )
    .expect("Failed to build HTTP client");

    let auto_refresh = Arc::new(AutoRefresh::new(
        Arc::new(PgCharacterSource::new(pool.clone())),
        Arc::new(refresher),
        Some(Arc::new(PgActivityLog::new(pool.clone()))),
        config.refresh,
        shutdown.clone(),
    ));
    tracing::info!(
        pacing_ms = config.refresh.pacing.as_millis() as u64,
        deadline_secs = config.refresh.deadline.as_secs(),
        "Auto-refresh service ready"
    );

    // --- Scheduler ---
    let scheduler_handle = config.auto_refresh_interval_secs.map(|secs| {
        tokio::spawn(background::auto_refresh::run(
            Arc::clone(&auto_refresh),
            Duration::from_secs(secs),
            shutdown.clone(),
        ))
    });

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        auto_refresh,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    serve_with_shutdown(listener, app, shutdown.clone(), shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    // The shutdown token was cancelled when the signal arrived, which stopped
    // any running pass and the scheduler loop.
    tracing::info!("Server stopped, cleaning up");

    if let Some(handle) = scheduler_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Auto-refresh scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
