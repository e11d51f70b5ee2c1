//! HTTP-level tests for registration, login, token refresh, logout, and the
//! caller's profile.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_department, create_user, get, get_auth, post_json, post_json_auth,
    put_json_auth, TEST_PASSWORD,
};
use sqlx::PgPool;
use unishow_core::roles::Role;

async fn login(
    app: axum::Router,
    username: &str,
    password: &str,
) -> axum::http::Response<axum::body::Body> {
    post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_registration_signs_in(pool: PgPool) {
    let test_app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "alice",
        "email": "alice@uni.test",
        "password": "s3cret-pass",
        "password_confirm": "s3cret-pass",
        "role": "student",
        "enrollment_no": "EN-001",
    });
    let response = post_json(test_app.app(), "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["role"], "student");

    let logged: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM system_logs WHERE event = 'User Registered'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(logged, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_registration_rules(pool: PgPool) {
    let dept = create_department(&pool, "Physics", "PHY").await;
    let test_app = common::build_test_app(pool);

    let cases = [
        (
            serde_json::json!({
                "username": "s1", "email": "s1@uni.test", "password": "longenough",
                "password_confirm": "longenough", "role": "student",
            }),
            "Enrollment number is required for students.",
        ),
        (
            serde_json::json!({
                "username": "a1", "email": "a1@uni.test", "password": "longenough",
                "password_confirm": "longenough", "role": "admin",
            }),
            "Department is required for event admins.",
        ),
        (
            serde_json::json!({
                "username": "r1", "email": "r1@uni.test", "password": "longenough",
                "password_confirm": "longenough", "role": "superadmin",
                "department_id": dept.id,
            }),
            "Only Students and Event Admins can register directly.",
        ),
        (
            serde_json::json!({
                "username": "s2", "email": "s2@uni.test", "password": "longenough",
                "password_confirm": "different1", "role": "student", "enrollment_no": "E2",
            }),
            "The two password fields didn't match.",
        ),
        (
            serde_json::json!({
                "username": "a b", "email": "ab@uni.test", "password": "longenough",
                "password_confirm": "longenough", "role": "student", "enrollment_no": "E3",
            }),
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ),
    ];

    for (body, message) in cases {
        let response = post_json(test_app.app(), "/api/v1/auth/register", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"], message);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_registration_rejects_bad_email_and_short_password(pool: PgPool) {
    let test_app = common::build_test_app(pool);

    let bad_email = serde_json::json!({
        "username": "s1", "email": "not-an-email", "password": "longenough",
        "password_confirm": "longenough", "role": "student", "enrollment_no": "E1",
    });
    let response = post_json(test_app.app(), "/api/v1/auth/register", bad_email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let short = serde_json::json!({
        "username": "s2", "email": "s2@uni.test", "password": "short",
        "password_confirm": "short", "role": "student", "enrollment_no": "E2",
    });
    let response = post_json(test_app.app(), "/api/v1/auth/register", short).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_conflicts(pool: PgPool) {
    create_user(&pool, "alice", Role::Student, None).await;
    let test_app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "alice", "email": "other@uni.test", "password": "longenough",
        "password_confirm": "longenough", "role": "student", "enrollment_no": "E9",
    });
    let response = post_json(test_app.app(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_by_username_or_email(pool: PgPool) {
    create_user(&pool, "alice", Role::Student, None).await;
    let test_app = common::build_test_app(pool);

    let by_name = login(test_app.app(), "alice", TEST_PASSWORD).await;
    assert_eq!(by_name.status(), StatusCode::OK);

    let by_email = login(test_app.app(), "Alice@uni.test", TEST_PASSWORD).await;
    assert_eq!(by_email.status(), StatusCode::OK);
    assert_eq!(body_json(by_email).await["user"]["username"], "alice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wrong_password_and_lockout(pool: PgPool) {
    create_user(&pool, "alice", Role::Student, None).await;
    let test_app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = login(test_app.app(), "alice", "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Locked now, even with the right password.
    let response = login(test_app.app(), "alice", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_and_logout_revokes(pool: PgPool) {
    create_user(&pool, "alice", Role::Student, None).await;
    let test_app = common::build_test_app(pool);

    let json = body_json(login(test_app.app(), "alice", TEST_PASSWORD).await).await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();

    let refreshed = post_json(
        test_app.app(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(refreshed.status(), StatusCode::OK);
    let refreshed = body_json(refreshed).await;

    // The old token was single-use.
    let reused = post_json(
        test_app.app(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);

    let access = refreshed["access_token"].as_str().unwrap();
    let logout = post_json_auth(
        test_app.app(),
        "/api/v1/auth/logout",
        serde_json::json!({}),
        access,
    )
    .await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let after_logout = post_json(
        test_app.app(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refreshed["refresh_token"] }),
    )
    .await;
    assert_eq!(after_logout.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_read_and_update(pool: PgPool) {
    let dept = create_department(&pool, "Physics", "PHY").await;
    let alice = create_user(&pool, "alice", Role::Student, None).await;
    let test_app = common::build_test_app(pool);
    let token = test_app.token_for(&alice);

    let response = get_auth(test_app.app(), "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");
    assert!(json["data"].get("password_hash").is_none());

    let response = put_json_auth(
        test_app.app(),
        "/api/v1/me",
        serde_json::json!({ "email": "alice@physics.test", "department_id": dept.id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "alice@physics.test");
    assert_eq!(json["data"]["department_id"], dept.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_requires_token(pool: PgPool) {
    let test_app = common::build_test_app(pool);
    let response = get(test_app.app(), "/api/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
