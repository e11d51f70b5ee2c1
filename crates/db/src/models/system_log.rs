//! System log entity model, insert DTO, and query filter.
//!
//! System logs are append-only; there is no update DTO.

use serde::Serialize;
use sqlx::FromRow;
use unishow_core::system_log::{LogLevel, LogType};
use unishow_core::types::{DbId, Timestamp};

/// A row from `system_logs` joined with the acting user's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemLogEntry {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub level: String,
    pub log_type: String,
    pub event: String,
    pub user_id: Option<DbId>,
    pub username: Option<String>,
    pub details: String,
}

/// DTO for appending a system log entry.
#[derive(Debug, Clone)]
pub struct CreateSystemLog {
    pub level: LogLevel,
    pub log_type: LogType,
    pub event: String,
    pub user_id: Option<DbId>,
    pub details: String,
}

/// Filter parameters for the log viewer. Values are already normalized.
#[derive(Debug, Clone, Default)]
pub struct SystemLogQuery {
    pub since: Option<Timestamp>,
    /// Upper-case level name.
    pub level: Option<String>,
    /// Upper-case type name.
    pub log_type: Option<String>,
    /// Matched with ILIKE against event, details, and username.
    pub search: Option<String>,
}
