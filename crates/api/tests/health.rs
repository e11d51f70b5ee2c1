//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, get, send};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let test_app = common::build_test_app(pool);
    let response = get(test_app.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["media_writable"], true);
    assert!(json["checked_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_media_root_degrades_health(pool: PgPool) {
    let common::TestApp { router, media, .. } = common::build_test_app(pool);
    media.close().unwrap();

    let response = get(router, "/health").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["media_writable"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let test_app = common::build_test_app(pool);
    let response = get(test_app.app(), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let test_app = common::build_test_app(pool);
    let response = get(test_app.app(), "/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disallowed_host_is_rejected(pool: PgPool) {
    let test_app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/health")
        .header("host", "evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(test_app.app(), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DISALLOWED_HOST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn host_with_port_is_allowed(pool: PgPool) {
    let test_app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/health")
        .header("host", "localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(test_app.app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
}
