//! Backup metadata rows and the JSON dump payload.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use unishow_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// A row from the `system_backups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemBackup {
    pub id: DbId,
    pub backup_id: String,
    pub created_at: Timestamp,
    pub backup_type: String,
    pub status: String,
    pub file_path: String,
    pub file_size: i64,
    pub created_by: Option<DbId>,
    pub error_message: Option<String>,
}

/// Aggregate figures shown above the backup list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BackupStats {
    pub total_backups: i64,
    /// Sum of `file_size` over every backup, in bytes.
    pub storage_used: i64,
    pub last_backup: Option<Timestamp>,
}

/// DTO for recording a finished backup. The identifier is generated on insert.
#[derive(Debug)]
pub struct CreateSystemBackup {
    pub backup_type: String,
    pub status: String,
    pub file_path: String,
    pub file_size: i64,
    pub created_by: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Dump payload
// ---------------------------------------------------------------------------

/// Contents of a backup file.
///
/// Field names mirror the table columns; timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupPayload {
    pub events: Vec<EventRecord>,
    pub users: Vec<UserRecord>,
    pub departments: Vec<DepartmentRecord>,
    pub tickets: Vec<TicketRecord>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User columns needed to rebuild an account, password hash included.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub location: String,
    pub image: Option<String>,
    pub available_tickets: i32,
    pub ticket_price: f64,
    pub category: String,
    pub department_id: DbId,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub booked_at: Timestamp,
    pub qr_code: String,
}

/// Row counts written by a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub departments: u64,
    pub users: u64,
    pub events: u64,
    pub tickets: u64,
}
