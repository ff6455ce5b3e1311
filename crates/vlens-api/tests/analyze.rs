//! End-to-end tests for the analysis pipeline against a mocked provider.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vlens_api::{create_router, ApiConfig, AppState};
use vlens_gemini::PollConfig;

const QUERY: &str = "What exercise is shown?";

struct TestApp {
    router: axum::Router,
    server: MockServer,
    spool_dir: tempfile::TempDir,
}

async fn test_app(api_key: Option<&str>) -> TestApp {
    let server = MockServer::start().await;
    let spool_dir = tempfile::tempdir().unwrap();

    let config = ApiConfig {
        gemini_base_url: server.uri(),
        api_key: api_key.map(|k| k.to_string()),
        spool_dir: Some(spool_dir.path().to_path_buf()),
        poll: PollConfig {
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(40),
            deadline: Duration::from_secs(5),
        },
        ..ApiConfig::default()
    };

    TestApp {
        router: create_router(AppState::new(config)),
        server,
        spool_dir,
    }
}

impl TestApp {
    fn spool_is_empty(&self) -> bool {
        std::fs::read_dir(self.spool_dir.path()).unwrap().count() == 0
    }

    async fn remote_calls(&self) -> usize {
        self.server.received_requests().await.unwrap().len()
    }
}

fn file_json(state: &str) -> Value {
    json!({
        "name": "files/abc",
        "uri": "https://files.example.com/files/abc",
        "mimeType": "video/mp4",
        "state": state,
    })
}

/// Mount the upload handshake + finalize pair.
async fn mount_upload(server: &MockServer, state: &str) {
    let upload_url = format!("{}/upload/v1beta/files/session-1", server.uri());

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("X-Goog-Upload-Command", "start"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("X-Goog-Upload-URL", upload_url.as_str()),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files/session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "file": file_json(state) })))
        .mount(server)
        .await;
}

async fn mount_generate(server: &MockServer, answer: &str) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": answer }], "role": "model" },
                "finishReason": "STOP"
            }]
        })))
        .mount(server)
        .await;
}

/// Build a multipart/form-data body by hand.
fn multipart_request(
    video: Option<(&str, &[u8])>,
    query: Option<&str>,
    api_key: Option<&str>,
) -> Request<Body> {
    const BOUNDARY: &str = "vlens-test-boundary";
    let mut body: Vec<u8> = Vec::new();

    if let Some((filename, bytes)) = video {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(query) = query {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"query\"\r\n\r\n{query}\r\n")
                .as_bytes(),
        );
    }
    if let Some(key) = api_key {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"api_key\"\r\n\r\n{key}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Some("test-key")).await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_index_page_is_served() {
    let app = test_app(Some("test-key")).await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Analyse Video"));
}

#[tokio::test]
async fn test_ready_reports_credential_state() {
    let app = test_app(None).await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["credential_configured"], false);
}

#[tokio::test]
async fn test_successful_analysis_for_each_supported_format() {
    for filename in ["workout.mp4", "workout.mov", "workout.avi"] {
        let app = test_app(Some("test-key")).await;
        mount_upload(&app.server, "ACTIVE").await;
        mount_generate(&app.server, "## Answer\nBarbell squats, performed with good depth.").await;

        let response = app
            .router
            .clone()
            .oneshot(multipart_request(
                Some((filename, b"fake-video-bytes")),
                Some(QUERY),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "failed for {filename}");
        let body = response_json(response).await;
        let answer = body["answer"].as_str().unwrap();
        assert!(!answer.trim().is_empty());
        assert!(answer.contains("Barbell squats"));
        assert!(app.spool_is_empty(), "temp file left behind for {filename}");
    }
}

#[tokio::test]
async fn test_empty_query_never_reaches_the_provider() {
    let app = test_app(Some("test-key")).await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("clip.mp4", b"fake-video-bytes")),
            Some("   "),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Please enter a question"));
    assert_eq!(app.remote_calls().await, 0);
    assert!(app.spool_is_empty());
}

#[tokio::test]
async fn test_missing_credential_blocks_before_any_remote_call() {
    let app = test_app(None).await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("clip.mp4", b"fake-video-bytes")),
            Some(QUERY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Google API key"));
    assert_eq!(app.remote_calls().await, 0);
}

#[tokio::test]
async fn test_request_key_overrides_missing_server_key() {
    let app = test_app(None).await;
    mount_upload(&app.server, "ACTIVE").await;
    mount_generate(&app.server, "Push-ups.").await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("clip.mp4", b"fake-video-bytes")),
            Some(QUERY),
            Some("user-supplied-key"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let app = test_app(Some("test-key")).await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("slides.pdf", b"%PDF-1.4")),
            Some(QUERY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Unsupported video format"));
    assert_eq!(app.remote_calls().await, 0);
}

#[tokio::test]
async fn test_empty_upload_body_is_rejected() {
    let app = test_app(Some("test-key")).await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(Some(("clip.mp4", b"")), Some(QUERY), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("empty"));
    assert_eq!(app.remote_calls().await, 0);
    assert!(app.spool_is_empty());
}

#[tokio::test]
async fn test_missing_video_field_is_rejected() {
    let app = test_app(Some("test-key")).await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(None, Some(QUERY), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_key_maps_to_specific_message() {
    let app = test_app(Some("revoked-key")).await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "API_KEY_INVALID",
                    "domain": "googleapis.com"
                }]
            }
        })))
        .mount(&app.server)
        .await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("clip.mp4", b"fake-video-bytes")),
            Some(QUERY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Invalid API key"));
    assert!(app.spool_is_empty());
}

#[tokio::test]
async fn test_other_remote_failures_map_to_generic_message_and_clean_up() {
    let app = test_app(Some("test-key")).await;
    mount_upload(&app.server, "ACTIVE").await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "Internal error encountered.", "status": "INTERNAL" }
        })))
        .mount(&app.server)
        .await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("clip.mp4", b"fake-video-bytes")),
            Some(QUERY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("An error occurred during analysis"));
    assert!(app.spool_is_empty(), "temp file must be removed on failure");
}

#[tokio::test]
async fn test_pipeline_waits_through_processing_then_invokes_agent_once() {
    let app = test_app(Some("test-key")).await;
    mount_upload(&app.server, "PROCESSING").await;

    // Three PROCESSING polls before the file becomes ACTIVE.
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("PROCESSING")))
        .up_to_n_times(3)
        .mount(&app.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("ACTIVE")))
        .mount(&app.server)
        .await;

    mount_generate(&app.server, "Deadlifts.").await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            Some(("clip.mp4", b"fake-video-bytes")),
            Some(QUERY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let requests = app.server.received_requests().await.unwrap();
    let polls = requests
        .iter()
        .filter(|r| r.url.path() == "/v1beta/files/abc")
        .count();
    let generations = requests
        .iter()
        .filter(|r| r.url.path().ends_with(":generateContent"))
        .count();
    assert_eq!(polls, 4);
    assert_eq!(generations, 1);
}
