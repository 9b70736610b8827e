#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use study_tracker_server::storage::MemoryStorage;
use study_tracker_server::web::create_app_router;
use tower::ServiceExt;

/// Test context for endpoint tests.
pub struct TestContext {
    pub storage: Arc<MemoryStorage>,
    pub app: Router,
}

/// Setup function for endpoint tests using in-memory storage.
pub fn setup() -> TestContext {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let storage = Arc::new(MemoryStorage::new());
    let app = create_app_router(storage.clone());
    TestContext { storage, app }
}

/// Status, content type and decoded body of a test response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

/// Sends a request to the app, with an optional JSON body, and decodes the response.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    match body {
        Some(json) => send_raw(app, method, uri, &json.to_string()).await,
        None => {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            dispatch(app, request).await
        }
    }
}

/// Sends a JSON content-typed request whose body is the given text, valid JSON or not.
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        content_type,
        body,
    }
}

/// HTTP response snapshot for error responses, whose bodies are deterministic.
#[derive(Debug, Serialize)]
pub struct HttpResponseSnapshot {
    test_context: String,
    status: u16,
    content_type: Option<String>,
    json_body: Value,
}

impl HttpResponseSnapshot {
    /// Create a new HTTP response snapshot.
    pub fn new(response: &TestResponse, test_context: &str) -> Self {
        Self {
            test_context: test_context.to_string(),
            status: response.status.as_u16(),
            content_type: response.content_type.clone(),
            json_body: response.body.clone(),
        }
    }
}
