//! Repository for `system_backups` plus the whole-database snapshot and
//! restore used by the backup feature.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use unishow_core::backup::{backup_id_prefix, format_backup_id};
use unishow_core::types::DbId;

use crate::models::backup::{
    BackupPayload, BackupStats, CreateSystemBackup, DepartmentRecord, EventRecord,
    RestoreSummary, SystemBackup, TicketRecord, UserRecord,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "id, backup_id, created_at, backup_type, status, file_path, file_size, \
                        created_by, error_message";

const DEPARTMENT_COLUMNS: &str = "id, name, code, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, email, password_hash, role, enrollment_no, \
                             department_id, profile_image, is_active, last_login_at, \
                             created_at, updated_at";

const EVENT_COLUMNS: &str = "id, title, description, starts_at, location, image, \
                              available_tickets, ticket_price, category, department_id, \
                              created_by, created_at, updated_at";

const TICKET_COLUMNS: &str = "id, event_id, user_id, booked_at, qr_code";

/// Tables rebuilt by a restore, in insert order.
const RESTORED_TABLES: [&str; 4] = ["departments", "users", "events", "tickets"];

// ---------------------------------------------------------------------------
// BackupRepo
// ---------------------------------------------------------------------------

/// Backup metadata plus snapshot/restore of the domain tables.
pub struct BackupRepo;

impl BackupRepo {
    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// Record a backup taken on `date`, generating its `BK<YYMMDD><n>` id.
    ///
    /// `n` is one more than the number of backups already carrying the
    /// date's prefix.
    pub async fn create(
        pool: &PgPool,
        date: NaiveDate,
        input: &CreateSystemBackup,
    ) -> Result<SystemBackup, sqlx::Error> {
        let prefix = backup_id_prefix(date);
        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM system_backups WHERE backup_id LIKE $1 || '%'",
        )
        .bind(&prefix)
        .fetch_one(pool)
        .await?;
        let backup_id = format_backup_id(date, existing + 1);

        let query = format!(
            "INSERT INTO system_backups (backup_id, backup_type, status, file_path, file_size, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemBackup>(&query)
            .bind(&backup_id)
            .bind(&input.backup_type)
            .bind(&input.status)
            .bind(&input.file_path)
            .bind(input.file_size)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_backup_id(
        pool: &PgPool,
        backup_id: &str,
    ) -> Result<Option<SystemBackup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_backups WHERE backup_id = $1");
        sqlx::query_as::<_, SystemBackup>(&query)
            .bind(backup_id)
            .fetch_optional(pool)
            .await
    }

    /// All backups, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SystemBackup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_backups ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, SystemBackup>(&query).fetch_all(pool).await
    }

    pub async fn stats(pool: &PgPool) -> Result<BackupStats, sqlx::Error> {
        sqlx::query_as::<_, BackupStats>(
            "SELECT COUNT(*) AS total_backups,
                    COALESCE(SUM(file_size), 0)::BIGINT AS storage_used,
                    MAX(created_at) AS last_backup
             FROM system_backups",
        )
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Snapshot / restore
    // -----------------------------------------------------------------------

    /// Read every department, user, event and ticket from one consistent
    /// snapshot.
    pub async fn snapshot(pool: &PgPool) -> Result<BackupPayload, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let departments = sqlx::query_as::<_, DepartmentRecord>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let events = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let tickets = sqlx::query_as::<_, TicketRecord>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(BackupPayload {
            events,
            users,
            departments,
            tickets,
        })
    }

    /// Replace the domain tables with `payload` in a single transaction.
    ///
    /// The account `keep_user_id` survives the wipe and any record with the
    /// same id in the payload is skipped. Id sequences are moved past the
    /// restored ids. Any error rolls the whole restore back.
    pub async fn restore(
        pool: &PgPool,
        payload: &BackupPayload,
        keep_user_id: DbId,
    ) -> Result<RestoreSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tickets").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM events").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM departments").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users WHERE id <> $1")
            .bind(keep_user_id)
            .execute(&mut *tx)
            .await?;

        let mut summary = RestoreSummary::default();
        for record in &payload.departments {
            Self::insert_department(&mut tx, record).await?;
            summary.departments += 1;
        }
        for record in payload.users.iter().filter(|u| u.id != keep_user_id) {
            Self::insert_user(&mut tx, record).await?;
            summary.users += 1;
        }
        for record in &payload.events {
            Self::insert_event(&mut tx, record).await?;
            summary.events += 1;
        }
        for record in &payload.tickets {
            Self::insert_ticket(&mut tx, record).await?;
            summary.tickets += 1;
        }

        for table in RESTORED_TABLES {
            sqlx::query(&format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                               COALESCE(MAX(id), 0) + 1, false) \
                 FROM {table}"
            ))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            departments = summary.departments,
            users = summary.users,
            events = summary.events,
            tickets = summary.tickets,
            "Restored domain tables",
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_department(
        tx: &mut Transaction<'_, Postgres>,
        r: &DepartmentRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO departments ({DEPARTMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(r.id)
        .bind(&r.name)
        .bind(&r.code)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_user(
        tx: &mut Transaction<'_, Postgres>,
        r: &UserRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(r.id)
        .bind(&r.username)
        .bind(&r.email)
        .bind(&r.password_hash)
        .bind(&r.role)
        .bind(&r.enrollment_no)
        .bind(r.department_id)
        .bind(&r.profile_image)
        .bind(r.is_active)
        .bind(r.last_login_at)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_event(
        tx: &mut Transaction<'_, Postgres>,
        r: &EventRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO events ({EVENT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(r.id)
        .bind(&r.title)
        .bind(&r.description)
        .bind(r.starts_at)
        .bind(&r.location)
        .bind(&r.image)
        .bind(r.available_tickets)
        .bind(r.ticket_price)
        .bind(&r.category)
        .bind(r.department_id)
        .bind(r.created_by)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_ticket(
        tx: &mut Transaction<'_, Postgres>,
        r: &TicketRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO tickets ({TICKET_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(r.id)
        .bind(r.event_id)
        .bind(r.user_id)
        .bind(r.booked_at)
        .bind(&r.qr_code)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
