#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use croplens_api::config::ServerConfig;
use croplens_api::middleware::owner::OWNER_HEADER;
use croplens_api::router::build_app_router;
use croplens_api::state::AppState;
use croplens_gateway::{ChatMessage, ChatModel, ModelSelection};
use croplens_tasks::{InMemoryTaskRegistry, TaskDispatcher};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Answers with the text of the last message it was sent.
pub struct EchoModel;

#[async_trait]
impl ChatModel for EchoModel {
    async fn call(&self, _model: &str, messages: &[ChatMessage]) -> String {
        let last = messages.last().map(ChatMessage::text).unwrap_or_default();
        format!("echo: {last}")
    }
}

/// Build the full application router backed by `model`.
///
/// Returns the dispatcher as well so tests can await task completion
/// instead of polling.
pub fn build_test_app(model: Arc<dyn ChatModel>) -> (Router, Arc<TaskDispatcher>) {
    let config = test_config();
    let dispatcher = Arc::new(TaskDispatcher::new(
        Arc::new(InMemoryTaskRegistry::new()),
        model,
        ModelSelection::default(),
    ));
    let state = AppState::new(config.clone(), Arc::clone(&dispatcher));
    (build_app_router(state, &config), dispatcher)
}

/// Test app with the echo model.
pub fn echo_app() -> (Router, Arc<TaskDispatcher>) {
    build_test_app(Arc::new(EchoModel))
}

/// Send a request through the router without a network socket.
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

/// GET `uri`, optionally as `owner`.
pub async fn get(app: Router, uri: &str, owner: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(owner) = owner {
        builder = builder.header(OWNER_HEADER, owner);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// POST a JSON body as `owner`.
pub async fn post_json(
    app: Router,
    uri: &str,
    owner: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(OWNER_HEADER, owner)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a url-encoded form as `owner`.
pub async fn post_form(app: Router, uri: &str, owner: &str, form: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(OWNER_HEADER, owner)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a multipart body built from `(name, filename, bytes)` parts.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    owner: &str,
    parts: &[(&str, Option<&str>, &[u8])],
) -> Response<Body> {
    let boundary = "croplens-test-boundary";
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        let headers = match filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
        };
        body.extend_from_slice(headers.as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(OWNER_HEADER, owner)
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Task id from a `Location` / redirect header.
pub fn task_id_from_location(response: &Response<Body>) -> String {
    let location = response
        .headers()
        .get("location")
        .expect("Missing Location header")
        .to_str()
        .unwrap();
    location
        .strip_prefix("/api/v1/tasks/")
        .expect("Location should point at a task")
        .to_string()
}
