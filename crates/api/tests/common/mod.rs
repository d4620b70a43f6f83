#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mu_tracker_core::audit::{AuditError, AuditEvent, AuditSink};
use mu_tracker_core::character::{
    CharacterRefresher, CharacterSource, RefreshError, SourceError, TrackedCharacter,
};
use mu_tracker_core::refresh::{AutoRefresh, RefreshSettings};
use mu_tracker_core::types::DbId;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use mu_tracker_api::config::{ServerConfig, SharedSecret};
use mu_tracker_api::router::build_app_router;
use mu_tracker_api::state::AppState;

pub const TEST_KEY: &str = "test-cron-key";

/// Build a test `ServerConfig` with safe defaults.
///
/// Pacing is zero so passes finish instantly unless a test opts in.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 330,
        cron_key: Some(SharedSecret::new(TEST_KEY)),
        refresh: RefreshSettings {
            pacing: Duration::ZERO,
            deadline: Duration::from_secs(300),
        },
        fetch_timeout_secs: 5,
        auto_refresh_interval_secs: None,
        log_file: None,
        install_check_files: vec![],
    }
}

/// A pool that is never reachable. Any query fails after a short wait.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://mu:mu@127.0.0.1:1/mu_test")
        .unwrap()
}

pub fn characters(count: i64) -> Vec<TrackedCharacter> {
    (1..=count)
        .map(|id| TrackedCharacter {
            id,
            name: format!("Hero{id}"),
            url: format!("https://example.test/char/{id}"),
            user_id: 1,
        })
        .collect()
}

/// Character list served from memory, or a fixed failure.
pub struct FakeSource {
    result: Result<Vec<TrackedCharacter>, SourceError>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with(characters: Vec<TrackedCharacter>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(characters),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: SourceError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CharacterSource for FakeSource {
    async fn list_characters(&self) -> Result<Vec<TrackedCharacter>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Records every call. Ids in `failing` return a fetch error. When gated,
/// each call waits for a permit first.
#[derive(Default)]
pub struct FakeRefresher {
    failing: HashSet<DbId>,
    gate: Option<Arc<Semaphore>>,
    pub seen: Mutex<Vec<DbId>>,
}

impl FakeRefresher {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(ids: impl IntoIterator<Item = DbId>) -> Arc<Self> {
        Arc::new(Self {
            failing: ids.into_iter().collect(),
            ..Self::default()
        })
    }

    pub fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl CharacterRefresher for FakeRefresher {
    async fn refresh(&self, id: DbId, _url: &str) -> Result<bool, RefreshError> {
        self.seen.lock().unwrap().push(id);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.failing.contains(&id) {
            return Err(RefreshError::Fetch(format!("character {id} unreachable")));
        }
        Ok(true)
    }
}

/// Keeps every activity log entry in memory.
#[derive(Default)]
pub struct RecordingAudit {
    pub events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAudit {
    pub fn recorded(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub audit: Arc<RecordingAudit>,
    /// Cancelled to stop running passes, as on server shutdown.
    pub shutdown: CancellationToken,
}

/// Build the full application router around fake collaborators.
///
/// Uses the same [`build_app_router`] as `main.rs` so tests exercise the
/// production middleware stack.
pub fn build_test_app(
    config: ServerConfig,
    source: Arc<FakeSource>,
    refresher: Arc<FakeRefresher>,
) -> TestApp {
    let audit = Arc::new(RecordingAudit::default());
    let shutdown = CancellationToken::new();
    let auto_refresh = Arc::new(AutoRefresh::new(
        source,
        refresher,
        Some(audit.clone()),
        config.refresh,
        shutdown.clone(),
    ));

    let state = AppState {
        pool: unreachable_pool(),
        config: Arc::new(config.clone()),
        auto_refresh,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        audit,
        shutdown,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
