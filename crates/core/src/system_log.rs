//! System log vocabulary: levels, categories, entry titles, and the
//! query-string filters accepted by the log viewer.

use chrono::Duration;
use serde::Serialize;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Levels and types
// ---------------------------------------------------------------------------

/// Severity of a system log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [Self::Info, Self::Warning, Self::Error, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }
}

/// Category of a system log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    Admin,
    Event,
    User,
    System,
}

impl LogType {
    pub const ALL: [LogType; 4] = [Self::Admin, Self::Event, Self::User, Self::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Event => "EVENT",
            Self::User => "USER",
            Self::System => "SYSTEM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin Action",
            Self::Event => "Event Log",
            Self::User => "User Action",
            Self::System => "System Log",
        }
    }
}

/// Titles written to the `event` column.
pub mod titles {
    pub const BACKUP_CREATED: &str = "Backup Created";
    pub const BACKUP_FAILED: &str = "Backup Failed";
    pub const BACKUP_RESTORED: &str = "Backup Restored";
    pub const RESTORE_FAILED: &str = "Restore Failed";
    pub const TICKET_BOOKED: &str = "Ticket Booked";
    pub const EVENT_CREATED: &str = "Event Created";
    pub const EVENT_SUGGESTED: &str = "Event Suggested";
    pub const EVENT_UPDATED: &str = "Event Updated";
    pub const EVENT_DELETED: &str = "Event Deleted";
    pub const DEPARTMENT_CREATED: &str = "Department Created";
    pub const DEPARTMENT_UPDATED: &str = "Department Updated";
    pub const DEPARTMENT_DELETED: &str = "Department Deleted";
    pub const USER_REGISTERED: &str = "User Registered";
    pub const USER_CREATED: &str = "User Created";
    pub const USER_UPDATED: &str = "User Updated";
    pub const PASSWORD_RESET: &str = "Password Reset";
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Relative window accepted by the `date_range` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Last24Hours,
    Last7Days,
    Last30Days,
}

impl DateRange {
    /// Parse a `date_range` value. Unknown values disable the filter.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "last_24_hours" => Some(Self::Last24Hours),
            "last_7_days" => Some(Self::Last7Days),
            "last_30_days" => Some(Self::Last30Days),
            _ => None,
        }
    }

    /// Earliest timestamp included in the window ending at `now`.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        let days = match self {
            Self::Last24Hours => 1,
            Self::Last7Days => 7,
            Self::Last30Days => 30,
        };
        now - Duration::days(days)
    }
}

/// Normalize a `log_level` / `log_type` filter value.
///
/// Empty and `all` (any case) disable the filter; anything else is upper-cased.
pub fn normalize_choice_filter(value: Option<&str>) -> Option<String> {
    let v = value?.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(v.to_ascii_uppercase())
    }
}

/// Normalize a free-text `search` filter. Blank disables it.
pub fn normalize_search(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
