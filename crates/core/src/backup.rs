//! Backup naming, identifiers, and status vocabulary.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Sub-directory of the media root holding backup JSON files.
pub const BACKUP_DIR: &str = "backups";

/// Prefix of every generated backup identifier.
pub const BACKUP_ID_PREFIX: &str = "BK";

// ---------------------------------------------------------------------------
// Type / status constants
// ---------------------------------------------------------------------------

pub const TYPE_FULL: &str = "FULL";
pub const TYPE_PARTIAL: &str = "PARTIAL";

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_FAILED: &str = "FAILED";

/// All valid backup statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_FAILED,
];

/// Backup scope. Only full backups are ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupType {
    Full,
    Partial,
}

impl BackupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => TYPE_FULL,
            Self::Partial => TYPE_PARTIAL,
        }
    }
}

/// Backup record status.
///
/// The create path writes `Completed` directly; a failed backup leaves no row.
/// `Pending`, `InProgress` and `Failed` exist only as named values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Failed => STATUS_FAILED,
        }
    }

    /// Parse from a string, returning an error for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_FAILED => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown backup status: '{other}'. Valid statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

/// Action accepted by the backup endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupAction {
    CreateBackup,
    RestoreBackup,
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Identifier prefix shared by all backups taken on `date`: `BK<YYMMDD>`.
pub fn backup_id_prefix(date: NaiveDate) -> String {
    format!("{BACKUP_ID_PREFIX}{}", date.format("%y%m%d"))
}

/// Identifier of the `ordinal`-th backup taken on `date` (1-based).
pub fn format_backup_id(date: NaiveDate, ordinal: i64) -> String {
    format!("{}{ordinal}", backup_id_prefix(date))
}

/// File name for a backup taken at `at`: `backup_<YYYYmmdd_HHMMSS>.json`.
pub fn backup_file_name(at: Timestamp) -> String {
    format!("backup_{}.json", at.format("%Y%m%d_%H%M%S"))
}
