//! Integration tests for `GET /logs/tail`.

mod common;

use std::io::Write;
use std::path::PathBuf;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use common::{body_json, body_text, build_test_app, get, test_config, FakeRefresher, FakeSource, TEST_KEY};
use serde_json::json;

fn app_with_log(path: PathBuf) -> common::TestApp {
    let mut config = test_config();
    config.log_file = Some(path);
    build_test_app(config, FakeSource::with(vec![]), FakeRefresher::ok())
}

fn write_log(lines: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 1..=lines {
        writeln!(file, "INFO request {i}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn returns_last_lines_as_plain_text() {
    let log = write_log(10);
    let app = app_with_log(log.path().to_path_buf());

    let response = get(app.router, &format!("/logs/tail?key={TEST_KEY}&lines=3")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = body_text(response).await;
    let expected = format!(
        "==> {} (last 3 lines) <==\nINFO request 8\nINFO request 9\nINFO request 10\n",
        log.path().display()
    );
    assert_eq!(text, expected);
}

#[tokio::test]
async fn line_count_is_clamped() {
    let log = write_log(5);
    let app = app_with_log(log.path().to_path_buf());

    let text = body_text(get(app.router.clone(), &format!("/logs/tail?key={TEST_KEY}&lines=0")).await).await;
    assert!(text.contains("(last 1 lines)"));
    assert!(text.ends_with("INFO request 5\n"));

    let text = body_text(get(app.router, &format!("/logs/tail?key={TEST_KEY}&lines=5000")).await).await;
    assert!(text.contains("(last 5 lines)"));
}

#[tokio::test]
async fn malformed_line_count_falls_back_to_default() {
    let log = write_log(150);
    let app = app_with_log(log.path().to_path_buf());

    let response = get(app.router, &format!("/logs/tail?key={TEST_KEY}&lines=abc")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("(last 100 lines)"));
    assert!(text.ends_with("INFO request 150\n"));
}

#[tokio::test]
async fn missing_log_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_log(dir.path().join("absent.log"));

    let response = get(app.router, &format!("/logs/tail?key={TEST_KEY}")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "No log file found");
}

#[tokio::test]
async fn requires_the_shared_key() {
    let log = write_log(3);
    let app = app_with_log(log.path().to_path_buf());

    let response = get(app.router, "/logs/tail?lines=3").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "error": "Unauthorized access" }));
}
