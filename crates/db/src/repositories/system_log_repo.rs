//! Repository for the append-only `system_logs` table.

use sqlx::PgPool;
use unishow_core::types::DbId;

use super::contains_pattern;
use crate::models::system_log::{CreateSystemLog, SystemLogEntry, SystemLogQuery};

/// Log columns joined with the acting user's name.
const ENTRY_SELECT: &str = "\
    SELECT l.id, l.timestamp, l.level, l.log_type, l.event, l.user_id, \
           u.username, l.details \
    FROM system_logs l \
    LEFT JOIN users u ON u.id = l.user_id";

/// Append and query system log entries.
pub struct SystemLogRepo;

impl SystemLogRepo {
    /// Append an entry, returning its id.
    pub async fn create(pool: &PgPool, input: &CreateSystemLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO system_logs (level, log_type, event, user_id, details)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(input.level.as_str())
        .bind(input.log_type.as_str())
        .bind(&input.event)
        .bind(input.user_id)
        .bind(&input.details)
        .fetch_one(pool)
        .await
    }

    /// Entries matching every set filter, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &SystemLogQuery,
    ) -> Result<Vec<SystemLogEntry>, sqlx::Error> {
        let query = format!(
            "{ENTRY_SELECT}
             WHERE ($1::TIMESTAMPTZ IS NULL OR l.timestamp >= $1)
               AND ($2::TEXT IS NULL OR l.level = $2)
               AND ($3::TEXT IS NULL OR l.log_type = $3)
               AND ($4::TEXT IS NULL
                    OR l.event ILIKE $4 ESCAPE '!'
                    OR l.details ILIKE $4 ESCAPE '!'
                    OR u.username ILIKE $4 ESCAPE '!')
             ORDER BY l.timestamp DESC, l.id DESC"
        );
        sqlx::query_as::<_, SystemLogEntry>(&query)
            .bind(params.since)
            .bind(&params.level)
            .bind(&params.log_type)
            .bind(params.search.as_deref().map(contains_pattern))
            .fetch_all(pool)
            .await
    }
}
