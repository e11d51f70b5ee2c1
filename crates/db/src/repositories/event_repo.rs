//! Repository for the `events` table.

use sqlx::{PgPool, Postgres, Transaction};
use unishow_core::types::DbId;

use super::contains_pattern;
use crate::models::event::{CreateEvent, Event, EventFilter, EventWithStats, UpdateEvent};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, starts_at, location, image, available_tickets, \
                        ticket_price, category, department_id, created_by, created_at, updated_at";

/// Event columns plus derived counts. Must be followed by a WHERE clause and
/// [`STATS_GROUP_BY`].
const STATS_SELECT: &str = "\
    SELECT e.id, e.title, e.description, e.starts_at, e.location, e.image, \
           e.available_tickets, e.ticket_price, e.category, e.department_id, \
           e.created_by, e.created_at, e.updated_at, \
           d.name AS department_name, \
           COUNT(t.id) AS tickets_issued, \
           e.available_tickets::BIGINT - COUNT(t.id) AS tickets_left, \
           (e.ticket_price = 0) AS is_free \
    FROM events e \
    JOIN departments d ON d.id = e.department_id \
    LEFT JOIN tickets t ON t.event_id = e.id";

const STATS_GROUP_BY: &str = "GROUP BY e.id, d.name";

// ---------------------------------------------------------------------------
// EventRepo
// ---------------------------------------------------------------------------

/// Provides CRUD operations and listings for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (title, description, starts_at, location, image, available_tickets,
                 ticket_price, category, department_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.location.trim())
            .bind(&input.image)
            .bind(input.available_tickets)
            .bind(input.ticket_price)
            .bind(&input.category)
            .bind(input.department_id)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an event together with its department name and ticket counts.
    pub async fn find_with_stats(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EventWithStats>, sqlx::Error> {
        let query = format!("{STATS_SELECT} WHERE e.id = $1 {STATS_GROUP_BY}");
        sqlx::query_as::<_, EventWithStats>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events matching `filter`, soonest first.
    pub async fn list(
        pool: &PgPool,
        filter: &EventFilter,
    ) -> Result<Vec<EventWithStats>, sqlx::Error> {
        let query = format!(
            "{STATS_SELECT}
             WHERE ($1::TEXT IS NULL OR e.category = $1)
               AND ($2::TEXT IS NULL OR e.title ILIKE $2 ESCAPE '!')
               AND ($3::TIMESTAMPTZ IS NULL OR e.starts_at >= $3)
               AND ($4::TIMESTAMPTZ IS NULL OR e.starts_at < $4)
               AND ($5::BIGINT IS NULL OR e.created_by = $5)
             {STATS_GROUP_BY}
             ORDER BY e.starts_at, e.id"
        );
        sqlx::query_as::<_, EventWithStats>(&query)
            .bind(&filter.category)
            .bind(filter.search.as_deref().map(contains_pattern))
            .bind(filter.starts_from)
            .bind(filter.starts_before)
            .bind(filter.created_by)
            .fetch_all(pool)
            .await
    }

    /// Events the user holds a ticket for, soonest first.
    pub async fn list_attended_by(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EventWithStats>, sqlx::Error> {
        let query = format!(
            "{STATS_SELECT}
             WHERE e.id IN (SELECT event_id FROM tickets WHERE user_id = $1)
             {STATS_GROUP_BY}
             ORDER BY e.starts_at, e.id"
        );
        sqlx::query_as::<_, EventWithStats>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count all events.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await
    }

    /// Count events that have not started yet.
    pub async fn count_upcoming(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE starts_at >= NOW()")
            .fetch_one(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    ///
    /// Runs inside a caller-owned transaction so a capacity change can be
    /// checked against the issued count under the event row lock.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                location = COALESCE($5, location),
                image = COALESCE($6, image),
                available_tickets = COALESCE($7, available_tickets),
                ticket_price = COALESCE($8, ticket_price),
                category = COALESCE($9, category),
                department_id = COALESCE($10, department_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.location.as_deref().map(str::trim))
            .bind(&input.image)
            .bind(input.available_tickets)
            .bind(input.ticket_price)
            .bind(&input.category)
            .bind(input.department_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete an event and, by cascade, its tickets.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
