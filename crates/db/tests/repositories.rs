//! Repository integration tests against a real database:
//! - Catalog CRUD and derived event counts
//! - Transactional ticket issuance and the (event, user) uniqueness backstop
//! - System log filtering
//! - Backup id generation, snapshot, and restore

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use unishow_core::system_log::{LogLevel, LogType};
use unishow_core::types::DbId;
use unishow_db::models::backup::CreateSystemBackup;
use unishow_db::models::department::{CreateDepartment, Department, UpdateDepartment};
use unishow_db::models::event::{CreateEvent, Event, EventFilter, UpdateEvent};
use unishow_db::models::session::CreateSession;
use unishow_db::models::system_log::{CreateSystemLog, SystemLogQuery};
use unishow_db::models::user::{CreateUser, User};
use unishow_db::repositories::{
    BackupRepo, DepartmentRepo, EventRepo, SessionRepo, SystemLogRepo, TicketRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn department(pool: &PgPool, name: &str, code: &str) -> Department {
    DepartmentRepo::create(
        pool,
        &CreateDepartment {
            name: name.to_string(),
            code: code.to_string(),
        },
    )
    .await
    .unwrap()
}

async fn user(pool: &PgPool, username: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@uni.test"),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
            enrollment_no: (role == "student").then(|| format!("EN-{username}")),
            department_id: None,
            profile_image: None,
        },
    )
    .await
    .unwrap()
}

async fn event(pool: &PgPool, title: &str, dept: DbId, owner: DbId, capacity: i32) -> Event {
    EventRepo::create(
        pool,
        &CreateEvent {
            title: title.to_string(),
            description: "An evening of talks".to_string(),
            starts_at: Utc::now() + Duration::days(7),
            location: "Main Hall".to_string(),
            image: None,
            available_tickets: capacity,
            ticket_price: 0.0,
            category: "seminar".to_string(),
            department_id: dept,
            created_by: owner,
        },
    )
    .await
    .unwrap()
}

async fn issue(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<DbId, sqlx::Error> {
    let mut tx = pool.begin().await?;
    TicketRepo::lock_event(&mut tx, event_id).await?;
    let ticket = TicketRepo::insert(&mut tx, event_id, user_id).await?;
    TicketRepo::set_qr_code(&mut tx, ticket.id, "qrcodes/qr_test.png").await?;
    tx.commit().await?;
    Ok(ticket.id)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn department_crud_and_active_events(pool: PgPool) {
    let physics = department(&pool, " Physics ", "PHY").await;
    assert_eq!(physics.name, "Physics");

    let updated = DepartmentRepo::update(
        &pool,
        physics.id,
        &UpdateDepartment {
            name: Some("Applied Physics".into()),
            code: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Applied Physics");
    assert_eq!(updated.code, "PHY");

    assert!(!DepartmentRepo::has_active_events(&pool, physics.id).await.unwrap());
    let admin = user(&pool, "ada", "admin").await;
    event(&pool, "Optics", physics.id, admin.id, 10).await;
    assert!(DepartmentRepo::has_active_events(&pool, physics.id).await.unwrap());

    assert!(DepartmentRepo::delete(&pool, physics.id).await.unwrap());
    assert_eq!(EventRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_department_code_violates_named_constraint(pool: PgPool) {
    department(&pool, "Physics", "PHY").await;
    let err = DepartmentRepo::create(
        &pool,
        &CreateDepartment {
            name: "Philosophy".into(),
            code: "PHY".into(),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.constraint() == Some("uq_departments_code")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_stats_track_issued_tickets(pool: PgPool) {
    let dept = department(&pool, "Music", "MUS").await;
    let admin = user(&pool, "maestro", "admin").await;
    let ev = event(&pool, "Spring Concert", dept.id, admin.id, 2).await;
    let student = user(&pool, "sam", "student").await;

    issue(&pool, ev.id, student.id).await.unwrap();

    let stats = EventRepo::find_with_stats(&pool, ev.id).await.unwrap().unwrap();
    assert_eq!(stats.tickets_issued, 1);
    assert_eq!(stats.tickets_left, 1);
    assert!(stats.is_free);
    assert_eq!(stats.department_name, "Music");

    let attended = EventRepo::list_attended_by(&pool, student.id).await.unwrap();
    assert_eq!(attended.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_list_filters(pool: PgPool) {
    let dept = department(&pool, "Drama", "DRA").await;
    let admin = user(&pool, "director", "admin").await;
    event(&pool, "Hamlet Night", dept.id, admin.id, 5).await;
    let talk = event(&pool, "Staging Talk", dept.id, admin.id, 5).await;
    let mut tx = pool.begin().await.unwrap();
    EventRepo::update(
        &mut tx,
        talk.id,
        &UpdateEvent {
            category: Some("educational".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let by_category = EventRepo::list(
        &pool,
        &EventFilter {
            category: Some("educational".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].event.title, "Staging Talk");

    let by_search = EventRepo::list(
        &pool,
        &EventFilter {
            search: Some("hamlet".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_search.len(), 1);

    let past = EventRepo::list(
        &pool,
        &EventFilter {
            starts_before: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(past.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_lookup_by_username_or_email(pool: PgPool) {
    let alice = user(&pool, "alice", "student").await;
    let by_name = UserRepo::find_by_username_or_email(&pool, "alice").await.unwrap();
    assert_eq!(by_name.unwrap().id, alice.id);

    let by_email = UserRepo::find_by_username_or_email(&pool, "ALICE@uni.test")
        .await
        .unwrap();
    assert_eq!(by_email.unwrap().id, alice.id);

    assert!(UserRepo::find_by_username_or_email(&pool, "nobody")
        .await
        .unwrap()
        .is_none());

    user(&pool, "adam", "admin").await;
    let admins = UserRepo::list(&pool, Some("admin"), None).await.unwrap();
    assert_eq!(admins.len(), 1);
    let searched = UserRepo::list(&pool, None, Some("AL")).await.unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(UserRepo::count(&pool, None).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

async fn session(pool: &PgPool, user_id: DbId, hash: &str, ttl: Duration) {
    SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            refresh_token_hash: hash.to_string(),
            expires_at: Utc::now() + ttl,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_session_is_consumed_once(pool: PgPool) {
    let alice = user(&pool, "alice", "student").await;
    session(&pool, alice.id, "live", Duration::days(7)).await;
    session(&pool, alice.id, "stale", Duration::minutes(-1)).await;

    let consumed = SessionRepo::consume(&pool, "live").await.unwrap().unwrap();
    assert_eq!(consumed.user_id, alice.id);
    assert!(consumed.revoked_at.is_some());
    assert!(!consumed.is_live(Utc::now()));

    assert!(SessionRepo::consume(&pool, "live").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "stale").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "unknown").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_out_revokes_only_live_sessions(pool: PgPool) {
    let alice = user(&pool, "alice", "student").await;
    let bob = user(&pool, "bob", "student").await;
    session(&pool, alice.id, "a1", Duration::days(7)).await;
    session(&pool, alice.id, "a2", Duration::days(7)).await;
    session(&pool, bob.id, "b1", Duration::days(7)).await;
    SessionRepo::consume(&pool, "a1").await.unwrap();

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, alice.id).await.unwrap(), 1);
    assert!(SessionRepo::consume(&pool, "a2").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "b1").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_ticket_for_same_user_hits_unique_constraint(pool: PgPool) {
    let dept = department(&pool, "Physics", "PHY").await;
    let admin = user(&pool, "ada", "admin").await;
    let ev = event(&pool, "Optics", dept.id, admin.id, 5).await;
    let student = user(&pool, "sam", "student").await;

    issue(&pool, ev.id, student.id).await.unwrap();
    let err = issue(&pool, ev.id, student.id).await.unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.constraint() == Some("uq_tickets_event_user")
    );

    let tickets = TicketRepo::list_for_event(&pool, ev.id).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].username, "sam");
    assert_eq!(tickets[0].ticket.qr_code, "qrcodes/qr_test.png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rolled_back_issuance_leaves_no_ticket(pool: PgPool) {
    let dept = department(&pool, "Physics", "PHY").await;
    let admin = user(&pool, "ada", "admin").await;
    let ev = event(&pool, "Optics", dept.id, admin.id, 5).await;
    let student = user(&pool, "sam", "student").await;

    {
        let mut tx = pool.begin().await.unwrap();
        let locked = TicketRepo::lock_event(&mut tx, ev.id).await.unwrap();
        assert!(locked.is_some());
        assert!(!TicketRepo::exists_for(&mut tx, ev.id, student.id).await.unwrap());
        TicketRepo::insert(&mut tx, ev.id, student.id).await.unwrap();
        assert_eq!(TicketRepo::count_for_event(&mut tx, ev.id).await.unwrap(), 1);
        tx.rollback().await.unwrap();
    }

    assert_eq!(TicketRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// System logs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn system_log_filters(pool: PgPool) {
    let root = user(&pool, "root", "superadmin").await;
    for (level, log_type, title, details) in [
        (LogLevel::Info, LogType::System, "Backup Created", "BK2401011"),
        (LogLevel::Error, LogType::System, "Backup Failed", "disk full"),
        (LogLevel::Info, LogType::Event, "Ticket Booked", "Optics"),
    ] {
        SystemLogRepo::create(
            &pool,
            &CreateSystemLog {
                level,
                log_type,
                event: title.to_string(),
                user_id: Some(root.id),
                details: details.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let all = SystemLogRepo::query(&pool, &SystemLogQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].event, "Ticket Booked");
    assert_eq!(all[0].username.as_deref(), Some("root"));

    let errors = SystemLogRepo::query(
        &pool,
        &SystemLogQuery {
            level: Some("ERROR".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(errors.len(), 1);

    let system_backups = SystemLogRepo::query(
        &pool,
        &SystemLogQuery {
            log_type: Some("SYSTEM".into()),
            search: Some("backup".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(system_backups.len(), 2);

    let by_username = SystemLogRepo::query(
        &pool,
        &SystemLogQuery {
            search: Some("roo".into()),
            since: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_username.len(), 3);
}

// ---------------------------------------------------------------------------
// Backups
// ---------------------------------------------------------------------------

fn completed_backup(path: &str, size: i64) -> CreateSystemBackup {
    CreateSystemBackup {
        backup_type: "FULL".into(),
        status: "COMPLETED".into(),
        file_path: path.into(),
        file_size: size,
        created_by: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backup_ids_count_up_per_day(pool: PgPool) {
    let day = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
    let first = BackupRepo::create(&pool, day, &completed_backup("a.json", 10))
        .await
        .unwrap();
    let second = BackupRepo::create(&pool, day, &completed_backup("b.json", 32))
        .await
        .unwrap();
    assert_eq!(first.backup_id, "BK2401201");
    assert_eq!(second.backup_id, "BK2401202");

    let next_day = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
    let third = BackupRepo::create(&pool, next_day, &completed_backup("c.json", 0))
        .await
        .unwrap();
    assert_eq!(third.backup_id, "BK2401211");

    let stats = BackupRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total_backups, 3);
    assert_eq!(stats.storage_used, 42);
    assert!(stats.last_backup.is_some());

    let found = BackupRepo::find_by_backup_id(&pool, "BK2401202").await.unwrap();
    assert_eq!(found.unwrap().file_path, "b.json");
    assert_eq!(BackupRepo::list(&pool).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn snapshot_then_restore_reproduces_counts(pool: PgPool) {
    let root = user(&pool, "root", "superadmin").await;
    let dept = department(&pool, "Physics", "PHY").await;
    let admin = user(&pool, "ada", "admin").await;
    let ev = event(&pool, "Optics", dept.id, admin.id, 5).await;
    let student = user(&pool, "sam", "student").await;
    issue(&pool, ev.id, student.id).await.unwrap();

    let payload = BackupRepo::snapshot(&pool).await.unwrap();
    assert_eq!(payload.users.len(), 3);

    // Changes after the snapshot are undone by the restore.
    department(&pool, "Chemistry", "CHE").await;
    user(&pool, "late", "student").await;

    let summary = BackupRepo::restore(&pool, &payload, root.id).await.unwrap();
    assert_eq!(summary.departments, 1);
    assert_eq!(summary.users, 2);
    assert_eq!(summary.events, 1);
    assert_eq!(summary.tickets, 1);

    assert_eq!(DepartmentRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(UserRepo::count(&pool, None).await.unwrap(), 3);
    assert_eq!(EventRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(TicketRepo::count(&pool).await.unwrap(), 1);

    // Sequences continue after the restored ids.
    let fresh = department(&pool, "Biology", "BIO").await;
    assert!(fresh.id > dept.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_restore_rolls_back(pool: PgPool) {
    let root = user(&pool, "root", "superadmin").await;
    let dept = department(&pool, "Physics", "PHY").await;
    let admin = user(&pool, "ada", "admin").await;
    event(&pool, "Optics", dept.id, admin.id, 5).await;

    let mut payload = BackupRepo::snapshot(&pool).await.unwrap();
    // Two departments sharing a code cannot both be inserted.
    let mut clone = payload.departments[0].clone();
    clone.id += 100;
    payload.departments.push(clone);

    let err = BackupRepo::restore(&pool, &payload, root.id).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(_));

    assert_eq!(DepartmentRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(EventRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(UserRepo::count(&pool, None).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn payload_serializes_with_table_keys(pool: PgPool) {
    department(&pool, "Physics", "PHY").await;
    let payload = BackupRepo::snapshot(&pool).await.unwrap();
    let json = serde_json::to_value(&payload).unwrap();
    for key in ["events", "users", "departments", "tickets"] {
        assert!(json[key].is_array(), "missing {key}");
    }
    assert_eq!(json["departments"][0]["code"], "PHY");
    assert!(json["departments"][0]["created_at"].is_string());
}
