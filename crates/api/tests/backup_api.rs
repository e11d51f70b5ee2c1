//! HTTP-level tests for backup creation and restore.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_department, create_event, create_user, get_auth, post_json_auth,
};
use sqlx::PgPool;
use unishow_core::roles::Role;

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn log_count(pool: &PgPool, event: &str, level: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM system_logs WHERE event = $1 AND level = $2")
        .bind(event)
        .bind(level)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_backup_then_restore_reproduces_counts(pool: PgPool) {
    let physics = create_department(&pool, "Physics", "PHY").await;
    let music = create_department(&pool, "Music", "MUS").await;
    let root = create_user(&pool, "root", Role::SuperAdmin, None).await;
    let admin = create_user(&pool, "organiser", Role::Admin, Some(music.id)).await;
    let alice = create_user(&pool, "alice", Role::Student, None).await;
    let talk = create_event(&pool, "Quantum Talk", physics.id, admin.id, 20, 3).await;
    create_event(&pool, "Choir", music.id, admin.id, 20, 4).await;

    let test_app = common::build_test_app(pool.clone());
    let booked = post_json_auth(
        test_app.app(),
        &format!("/api/v1/events/{}/book", talk.id),
        serde_json::json!({}),
        &test_app.token_for(&alice),
    )
    .await;
    assert_eq!(booked.status(), StatusCode::CREATED);

    let before = (
        count(&pool, "departments").await,
        count(&pool, "users").await,
        count(&pool, "events").await,
        count(&pool, "tickets").await,
    );

    let token = test_app.token_for(&root);
    let created = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "create_backup" }),
        &token,
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let json = body_json(created).await;
    let backup_id = json["data"]["backup_id"].as_str().unwrap().to_string();
    assert!(backup_id.starts_with("BK"));
    assert_eq!(json["data"]["status"], "COMPLETED");
    assert_eq!(json["data"]["backup_type"], "FULL");
    assert!(json["data"]["file_size"].as_i64().unwrap() > 0);
    assert_eq!(log_count(&pool, "Backup Created", "INFO").await, 1);

    // Mutate after the backup so the restore has something to undo.
    sqlx::query("DELETE FROM events").execute(&pool).await.unwrap();
    create_department(&pool, "Chemistry", "CHE").await;

    let restored = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "restore_backup", "backup_id": backup_id }),
        &token,
    )
    .await;
    assert_eq!(restored.status(), StatusCode::OK);
    let summary = body_json(restored).await;
    assert_eq!(summary["data"]["tickets"], 1);

    let after = (
        count(&pool, "departments").await,
        count(&pool, "users").await,
        count(&pool, "events").await,
        count(&pool, "tickets").await,
    );
    assert_eq!(before, after);
    assert_eq!(log_count(&pool, "Backup Restored", "INFO").await, 1);

    // Sequences continue past the restored ids.
    let next = create_department(&pool, "Biology", "BIO").await;
    assert!(next.id > physics.id.max(music.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_unknown_backup_is_logged_and_harmless(pool: PgPool) {
    let dept = create_department(&pool, "Physics", "PHY").await;
    let root = create_user(&pool, "root", Role::SuperAdmin, None).await;
    create_event(&pool, "Quantum Talk", dept.id, root.id, 20, 3).await;

    let test_app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "restore_backup", "backup_id": "BK0000001" }),
        &test_app.token_for(&root),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "BACKUP_NOT_FOUND");
    assert_eq!(log_count(&pool, "Restore Failed", "ERROR").await, 1);
    assert_eq!(count(&pool, "departments").await, 1);
    assert_eq!(count(&pool, "events").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_of_corrupt_file_is_shape_mismatch(pool: PgPool) {
    let root = create_user(&pool, "root", Role::SuperAdmin, None).await;
    let test_app = common::build_test_app(pool.clone());
    let token = test_app.token_for(&root);

    let created = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "create_backup" }),
        &token,
    )
    .await;
    let json = body_json(created).await;
    let backup_id = json["data"]["backup_id"].as_str().unwrap().to_string();
    let path = json["data"]["file_path"].as_str().unwrap().to_string();
    tokio::fs::write(&path, br#"{"events": "nope"}"#).await.unwrap();

    let response = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "restore_backup", "backup_id": backup_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "BACKUP_SHAPE_MISMATCH");
    assert_eq!(count(&pool, "users").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_requires_backup_id(pool: PgPool) {
    let root = create_user(&pool, "root", Role::SuperAdmin, None).await;
    let test_app = common::build_test_app(pool);

    let response = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "restore_backup" }),
        &test_app.token_for(&root),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_backup_list_reports_stats(pool: PgPool) {
    let root = create_user(&pool, "root", Role::SuperAdmin, None).await;
    let test_app = common::build_test_app(pool);
    let token = test_app.token_for(&root);

    for _ in 0..2 {
        let response = post_json_auth(
            test_app.app(),
            "/api/v1/admin/backup",
            serde_json::json!({ "action": "create_backup" }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(test_app.app(), "/api/v1/admin/backup", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_backups"], 2);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert!(json["storage_used"].as_i64().unwrap() > 0);
    assert!(json["last_backup"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_backup_is_superadmin_only(pool: PgPool) {
    let dept = create_department(&pool, "Music", "MUS").await;
    let admin = create_user(&pool, "organiser", Role::Admin, Some(dept.id)).await;
    let test_app = common::build_test_app(pool);

    let response = post_json_auth(
        test_app.app(),
        "/api/v1/admin/backup",
        serde_json::json!({ "action": "create_backup" }),
        &test_app.token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
