//! Server shutdown stops a pass started over HTTP.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{build_test_app, characters, test_config, FakeRefresher, FakeSource, TEST_KEY};
use mu_tracker_api::router::serve_with_shutdown;
use tokio::sync::{oneshot, Semaphore};

#[tokio::test]
async fn shutdown_cancels_running_pass_and_server_exits_promptly() {
    // No permits: without cancellation the first refresh would wait out the
    // full pass deadline.
    let gate = Arc::new(Semaphore::new(0));
    let refresher = FakeRefresher::gated(gate);
    let app = build_test_app(test_config(), FakeSource::with(characters(3)), refresher.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (signal_tx, signal_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(
        listener,
        app.router,
        app.shutdown.clone(),
        async move {
            let _ = signal_rx.await;
        },
    ));

    let url = format!("http://{addr}/cron/auto-refresh?key={TEST_KEY}");
    let request = tokio::spawn(async move {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status();
        let body = response.text().await.unwrap();
        (status, body)
    });

    while refresher.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let signalled_at = Instant::now();
    signal_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop well before the pass deadline")
        .unwrap()
        .unwrap();
    assert!(signalled_at.elapsed() < Duration::from_secs(5));
    assert!(app.shutdown.is_cancelled());

    let (status, body) = request.await.unwrap();
    assert_eq!(status, reqwest::StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Auto-refresh cancelled");
    assert_eq!(json["timed_out"], false);
    assert_eq!(json["errors"], 1);
    assert_eq!(json["skipped"], 2);
    assert_eq!(json["details"][0]["error"], "Cancelled");
    assert_eq!(json["details"][1]["error"], "Skipped: Cancelled");
    assert_eq!(json["details"][2]["skipped"], true);
    assert_eq!(refresher.call_count(), 1);
}
