#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use unishow_api::auth::jwt::{generate_access_token, JwtConfig};
use unishow_api::auth::password::hash_password;
use unishow_api::config::ServerConfig;
use unishow_api::router::build_app_router;
use unishow_api::state::AppState;
use unishow_core::roles::Role;
use unishow_core::types::DbId;
use unishow_db::models::department::{CreateDepartment, Department};
use unishow_db::models::event::{CreateEvent, Event};
use unishow_db::models::user::{CreateUser, User};
use unishow_db::repositories::{DepartmentRepo, EventRepo, UserRepo};

pub const TEST_PASSWORD: &str = "test_password_123!";
pub const TEST_HOST: &str = "localhost";

/// A router plus the temporary media root it writes to.
///
/// The directory is removed when this value is dropped, so keep it alive for
/// the whole test.
pub struct TestApp {
    pub router: Router,
    pub media: TempDir,
    pub config: Arc<ServerConfig>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Mint an access token for `user` without going through login.
    pub fn token_for(&self, user: &User) -> String {
        let role: Role = user.role.parse().expect("stored role should parse");
        generate_access_token(user.id, role, &self.config.jwt).expect("token should sign")
    }
}

/// Build a test `ServerConfig` with safe defaults and the given media root.
pub fn test_config(media_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        debug: true,
        allowed_hosts: vec![TEST_HOST.to_string(), "127.0.0.1".to_string()],
        cors_origins: vec!["http://localhost:5173".to_string()],
        media_root: media_root.to_path_buf(),
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over the given pool and a fresh temporary media root.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let media = tempfile::tempdir().expect("tempdir should be created");
    let config = Arc::new(test_config(media.path()));
    let state = AppState {
        pool,
        config: Arc::clone(&config),
    };
    TestApp {
        router: build_app_router(state, &config),
        media,
        config,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", TEST_HOST);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_department(pool: &PgPool, name: &str, code: &str) -> Department {
    DepartmentRepo::create(
        pool,
        &CreateDepartment {
            name: name.to_string(),
            code: code.to_string(),
        },
    )
    .await
    .expect("department creation should succeed")
}

/// Insert a user with [`TEST_PASSWORD`] directly in the database.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    role: Role,
    department_id: Option<DbId>,
) -> User {
    let enrollment_no = (role == Role::Student).then(|| format!("EN-{username}"));
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@uni.test"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.as_str().to_string(),
            enrollment_no,
            department_id,
            profile_image: None,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Insert an event starting `days_ahead` days from now.
pub async fn create_event(
    pool: &PgPool,
    title: &str,
    department_id: DbId,
    created_by: DbId,
    available_tickets: i32,
    days_ahead: i64,
) -> Event {
    EventRepo::create(
        pool,
        &CreateEvent {
            title: title.to_string(),
            description: format!("{title} description"),
            starts_at: Utc::now() + Duration::days(days_ahead),
            location: "Main Hall".to_string(),
            image: None,
            available_tickets,
            ticket_price: 0.0,
            category: "seminar".to_string(),
            department_id,
            created_by,
        },
    )
    .await
    .expect("event creation should succeed")
}
