mod common;

use axum::http::StatusCode;

use common::{body_json, echo_app, get};

#[tokio::test]
async fn health_reports_ok_and_idle_workers() {
    let (app, _) = echo_app();

    let response = get(app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["running_tasks"], 0);
    assert_eq!(body["in_flight_workers"], 0);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = echo_app();

    let response = get(app, "/api/v1/nope", Some("alice")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
