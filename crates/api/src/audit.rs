//! Writer for the `system_logs` audit trail.
//!
//! Audit writes never fail the request that triggered them; a failed insert
//! is reported through `tracing` instead.

use unishow_core::system_log::{LogLevel, LogType};
use unishow_core::types::DbId;
use unishow_db::models::system_log::CreateSystemLog;
use unishow_db::repositories::SystemLogRepo;
use unishow_db::DbPool;

/// Append an entry to the system log.
pub async fn record(
    pool: &DbPool,
    level: LogLevel,
    log_type: LogType,
    event: &str,
    user_id: Option<DbId>,
    details: impl Into<String>,
) {
    let entry = CreateSystemLog {
        level,
        log_type,
        event: event.to_string(),
        user_id,
        details: details.into(),
    };
    if let Err(e) = SystemLogRepo::create(pool, &entry).await {
        tracing::warn!(error = %e, event, "Failed to write system log entry");
    }
}

/// Shorthand for an INFO entry.
pub async fn info(
    pool: &DbPool,
    log_type: LogType,
    event: &str,
    user_id: Option<DbId>,
    details: impl Into<String>,
) {
    record(pool, LogLevel::Info, log_type, event, user_id, details).await;
}
