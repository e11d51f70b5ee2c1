//! Whole-database JSON backup and restore.
//!
//! A backup snapshots departments, users, events, and tickets into
//! `<media_root>/backups/backup_<timestamp>.json` and records a
//! `system_backups` row. A restore parses the file completely before touching
//! the database, then swaps the tables in a single transaction.

use std::path::Path;

use chrono::Utc;
use unishow_core::backup::{backup_file_name, BackupStatus, BackupType, BACKUP_DIR};
use unishow_core::types::DbId;
use unishow_db::models::backup::{BackupPayload, CreateSystemBackup, RestoreSummary, SystemBackup};
use unishow_db::repositories::BackupRepo;
use unishow_db::DbPool;

/// Why a backup or restore failed.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Backup {0} not found")]
    NotFound(String),

    #[error("Backup file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup file does not match the expected format: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Backup data violates a database constraint: {0}")]
    Constraint(#[source] sqlx::Error),

    #[error("Backup database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for BackupError {
    /// Integrity violations (SQLSTATE class 23) are the data's fault; anything
    /// else is an operational failure.
    fn from(err: sqlx::Error) -> Self {
        let is_integrity = matches!(
            &err,
            sqlx::Error::Database(db) if db.code().is_some_and(|c| c.starts_with("23"))
        );
        if is_integrity {
            BackupError::Constraint(err)
        } else {
            BackupError::Database(err)
        }
    }
}

/// Snapshot the domain tables to a new JSON file and record it.
pub async fn create_backup(
    pool: &DbPool,
    media_root: &Path,
    actor_id: DbId,
) -> Result<SystemBackup, BackupError> {
    let dir = media_root.join(BACKUP_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let payload = BackupRepo::snapshot(pool).await?;
    let taken_at = Utc::now();
    let path = dir.join(backup_file_name(taken_at));
    let bytes = serde_json::to_vec_pretty(&payload)?;
    tokio::fs::write(&path, &bytes).await?;

    let file_size = tokio::fs::metadata(&path).await?.len();
    let record = BackupRepo::create(
        pool,
        taken_at.date_naive(),
        &CreateSystemBackup {
            backup_type: BackupType::Full.as_str().to_string(),
            status: BackupStatus::Completed.as_str().to_string(),
            file_path: path.to_string_lossy().into_owned(),
            file_size: i64::try_from(file_size).unwrap_or(i64::MAX),
            created_by: Some(actor_id),
        },
    )
    .await?;

    tracing::info!(
        backup_id = %record.backup_id,
        file_size = record.file_size,
        user_id = actor_id,
        "Backup written",
    );
    Ok(record)
}

/// Replace the domain tables with the contents of backup `backup_id`.
///
/// The acting account is kept so the caller stays signed in.
pub async fn restore_backup(
    pool: &DbPool,
    backup_id: &str,
    actor_id: DbId,
) -> Result<RestoreSummary, BackupError> {
    let record = BackupRepo::find_by_backup_id(pool, backup_id)
        .await
        .map_err(BackupError::Database)?
        .ok_or_else(|| BackupError::NotFound(backup_id.to_string()))?;

    let bytes = tokio::fs::read(&record.file_path).await?;
    let payload: BackupPayload = serde_json::from_slice(&bytes)?;

    let summary = BackupRepo::restore(pool, &payload, actor_id).await?;
    tracing::info!(
        backup_id,
        user_id = actor_id,
        departments = summary.departments,
        users = summary.users,
        events = summary.events,
        tickets = summary.tickets,
        "Backup restored",
    );
    Ok(summary)
}
