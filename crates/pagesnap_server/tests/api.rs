use std::fs;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use pagesnap_core::{archive_key, Artifact};
use pagesnap_server::routes::CaptureResponse;
use pagesnap_server::{build_app, AppState, ServerConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXAMPLE: &str =
    "<html><head><title>Example</title></head><body><h1>Hi</h1></body></html>";

fn app_for(root: &std::path::Path) -> Router {
    pagesnap_logging::initialize_for_tests();
    let config = ServerConfig {
        archive_root: root.to_path_buf(),
        request_timeout_secs: 5,
        ..ServerConfig::default()
    };
    build_app(AppState::from_config(config))
}

async fn post_json(app: &Router, body: &str) -> (StatusCode, CaptureResponse) {
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/clone")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, bytes.to_vec())
}

async fn mock_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn capture_returns_links_that_serve_the_artifacts() {
    let server = MockServer::start().await;
    mock_page(&server, "/", EXAMPLE).await;
    let temp = TempDir::new().unwrap();
    let app = app_for(temp.path());
    let url = format!("{}/", server.uri());

    let (status, body) = post_json(&app, &serde_json::json!({ "url": url }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.success);
    assert_eq!(body.title.as_deref(), Some("Example"));
    let key = archive_key(&url);
    assert_eq!(body.key.as_deref(), Some(key.as_str()));
    assert_eq!(
        body.save_dir,
        Some(temp.path().join(&key).display().to_string())
    );
    let files = body.files.expect("files present");
    assert_eq!(files.full, format!("/cloned/{key}/full.html"));

    let (status, content_type, bytes) = get(&app, &files.full).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert_eq!(bytes, EXAMPLE.as_bytes());

    let (status, content_type, bytes) = get(&app, &files.info).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/json"));
    let info: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info["title"], "Example");
    assert_eq!(info["body"], "<h1>Hi</h1>");

    let (status, _, bytes) = get(&app, &files.simple).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).unwrap().contains("<title>Example</title>"));
}

#[tokio::test]
async fn capture_rejects_missing_or_empty_url() {
    let temp = TempDir::new().unwrap();
    let app = app_for(temp.path());

    for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": "   "}"#, "not json"] {
        let (status, response) = post_json(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(!response.success);
        assert!(response.error.is_some());
        assert!(response.files.is_none());
    }
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn capture_reports_fetch_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let app = app_for(temp.path());

    let (status, body) = post_json(
        &app,
        &serde_json::json!({ "url": format!("{}/down", server.uri()) }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.success);
    assert!(body.error.unwrap().contains("500"));
    assert_eq!(fs::read_dir(temp.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[tokio::test]
async fn listing_is_newest_first_and_skips_broken_entries() {
    let server = MockServer::start().await;
    mock_page(&server, "/a", "<title>A</title><p>a</p>").await;
    mock_page(&server, "/b", "<title>B</title><p>b</p>").await;
    let temp = TempDir::new().unwrap();
    let app = app_for(temp.path());

    for route in ["/a", "/b"] {
        let payload = serde_json::json!({ "url": format!("{}{route}", server.uri()) });
        let (status, _) = post_json(&app, &payload.to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let broken = temp.path().join(archive_key("https://broken.example"));
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join(Artifact::Full.file_name()), "<html></html>").unwrap();

    let (status, content_type, bytes) = get(&app, "/api/cloned-pages").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/json"));
    let pages: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(pages.len(), 2);
    let stamps: Vec<DateTime<Utc>> = pages
        .iter()
        .map(|p| p["timestamp"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(stamps[0] >= stamps[1]);
    for page in &pages {
        let key = page["key"].as_str().unwrap();
        assert_eq!(page["files"]["simple"], format!("/cloned/{key}/simple.html"));
        assert!(page["url"].as_str().unwrap().starts_with(&server.uri()));
    }
}

#[tokio::test]
async fn single_entry_lookup() {
    let server = MockServer::start().await;
    mock_page(&server, "/one", EXAMPLE).await;
    let temp = TempDir::new().unwrap();
    let app = app_for(temp.path());
    let url = format!("{}/one", server.uri());
    post_json(&app, &serde_json::json!({ "url": url }).to_string()).await;

    let (status, _, bytes) = get(&app, &format!("/api/cloned-pages/{}", archive_key(&url))).await;
    assert_eq!(status, StatusCode::OK);
    let entry: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(entry["url"], url);

    let (status, _, _) = get(&app, "/api/cloned-pages/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_artifacts_are_not_served() {
    let temp = TempDir::new().unwrap();
    let key = archive_key("https://example.com");
    let dir = temp.path().join(&key);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("secret.txt"), "x").unwrap();
    let app = app_for(temp.path());

    let (status, _, _) = get(&app, &format!("/cloned/{key}/secret.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = get(&app, &format!("/cloned/{key}/full.html")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = get(&app, "/cloned/..%2F..%2Fetc/info.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_and_info_pages() {
    let temp = TempDir::new().unwrap();
    let app = app_for(temp.path());

    let (status, content_type, bytes) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(String::from_utf8(bytes).unwrap().contains("/api/clone"));

    let (status, _, bytes) = get(&app, "/api/info").await;
    assert_eq!(status, StatusCode::OK);
    let info: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info["success"], true);
    assert_eq!(info["status"], "running");
    assert_eq!(info["publicPrefix"], "/cloned");
    assert_eq!(info["archiveRoot"], temp.path().display().to_string());
}
