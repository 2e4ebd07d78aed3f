mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};

use common::{echo_app, send};

#[tokio::test]
async fn preflight_allows_owner_header_from_front_end() {
    let (app, _) = echo_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/tasks")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,x-user-id")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    let allowed = headers["access-control-allow-headers"].to_str().unwrap();
    assert!(allowed.contains("x-user-id"));
}

#[tokio::test]
async fn responses_expose_location_to_allowed_origin() {
    let (app, _) = echo_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    let exposed = response.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(exposed.contains("location"));
}

#[tokio::test]
async fn unknown_origin_gets_no_cors_grant() {
    let (app, _) = echo_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("origin", "http://evil.test")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
