//! HTTP-level tests for the system log viewer.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, get_auth};
use sqlx::PgPool;
use unishow_core::roles::Role;
use unishow_core::system_log::{LogLevel, LogType};
use unishow_db::models::system_log::CreateSystemLog;
use unishow_db::repositories::SystemLogRepo;

async fn seed_log(
    pool: &PgPool,
    level: LogLevel,
    log_type: LogType,
    event: &str,
    user_id: Option<i64>,
    details: &str,
) {
    SystemLogRepo::create(
        pool,
        &CreateSystemLog {
            level,
            log_type,
            event: event.to_string(),
            user_id,
            details: details.to_string(),
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_log_filters(pool: PgPool) {
    let root = create_user(&pool, "root", Role::SuperAdmin, None).await;
    let alice = create_user(&pool, "alice", Role::Student, None).await;
    let info = LogLevel::Info;
    seed_log(&pool, info, LogType::Event, "Ticket Booked", Some(alice.id), "gig").await;
    seed_log(&pool, LogLevel::Error, LogType::System, "Backup Failed", Some(root.id), "disk full")
        .await;
    seed_log(&pool, info, LogType::System, "Backup Created", None, "BK1").await;
    sqlx::query(
        "UPDATE system_logs SET timestamp = NOW() - INTERVAL '10 days'
         WHERE event = 'Backup Created'",
    )
    .execute(&pool)
    .await
    .unwrap();

    let test_app = common::build_test_app(pool);
    let token = test_app.token_for(&root);
    let fetch = |uri: &'static str| {
        let app = test_app.app();
        let token = token.clone();
        async move { body_json(get_auth(app, uri, &token).await).await }
    };

    let all = fetch("/api/v1/admin/logs").await;
    assert_eq!(all["data"].as_array().unwrap().len(), 3);
    assert_eq!(all["log_levels"].as_array().unwrap().len(), 4);
    assert_eq!(all["log_types"][0]["value"], "ADMIN");

    let errors = fetch("/api/v1/admin/logs?log_level=error").await;
    assert_eq!(errors["data"].as_array().unwrap().len(), 1);
    assert_eq!(errors["data"][0]["event"], "Backup Failed");

    let system = fetch("/api/v1/admin/logs?log_type=System&log_level=all").await;
    assert_eq!(system["data"].as_array().unwrap().len(), 2);

    let week = fetch("/api/v1/admin/logs?date_range=last_7_days").await;
    assert_eq!(week["data"].as_array().unwrap().len(), 2);

    let ignored = fetch("/api/v1/admin/logs?date_range=forever").await;
    assert_eq!(ignored["data"].as_array().unwrap().len(), 3);

    let by_user = fetch("/api/v1/admin/logs?search=ALICE").await;
    assert_eq!(by_user["data"].as_array().unwrap().len(), 1);
    assert_eq!(by_user["data"][0]["username"], "alice");

    let by_details = fetch("/api/v1/admin/logs?search=disk").await;
    assert_eq!(by_details["data"][0]["level"], "ERROR");

    let literal = fetch("/api/v1/admin/logs?search=_").await;
    assert!(literal["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logs_are_superadmin_only(pool: PgPool) {
    let alice = create_user(&pool, "alice", Role::Student, None).await;
    let test_app = common::build_test_app(pool);

    let response = get_auth(
        test_app.app(),
        "/api/v1/admin/logs",
        &test_app.token_for(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
