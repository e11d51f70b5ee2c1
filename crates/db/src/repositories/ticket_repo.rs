//! Repository for the `tickets` table.
//!
//! Issuance is split into small statements that run inside a transaction
//! owned by the caller, which holds the event row lock from
//! [`TicketRepo::lock_event`] until commit.

use sqlx::{PgPool, Postgres, Transaction};
use unishow_core::types::DbId;

use crate::models::event::Event;
use crate::models::ticket::{Ticket, TicketDetail};

const COLUMNS: &str = "id, event_id, user_id, booked_at, qr_code";

/// Ticket columns joined with event and holder, for [`TicketDetail`].
const DETAIL_SELECT: &str = "\
    SELECT t.id, t.event_id, t.user_id, t.booked_at, t.qr_code, \
           e.title AS event_title, e.starts_at AS event_starts_at, \
           e.location AS event_location, u.username \
    FROM tickets t \
    JOIN events e ON e.id = t.event_id \
    JOIN users u ON u.id = t.user_id";

/// Ticket issuance and lookups.
pub struct TicketRepo;

impl TicketRepo {
    // -----------------------------------------------------------------------
    // Transactional issuance
    // -----------------------------------------------------------------------

    /// Lock the event row for the rest of the transaction.
    ///
    /// Concurrent bookings for the same event block here until the holder
    /// commits or rolls back.
    pub async fn lock_event(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, description, starts_at, location, image, available_tickets, \
                    ticket_price, category, department_id, created_by, created_at, updated_at \
             FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Whether the user already holds a ticket for the event.
    pub async fn exists_for(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tickets WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Number of tickets issued for the event.
    pub async fn count_for_event(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert a ticket with an empty QR path.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (event_id, user_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Store the media-relative QR path on a ticket.
    pub async fn set_qr_code(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        qr_code: &str,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!("UPDATE tickets SET qr_code = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(qr_code)
            .fetch_one(&mut **tx)
            .await
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<TicketDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, TicketDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The user's ticket for an event, if any.
    pub async fn find_for_user_and_event(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE user_id = $1 AND event_id = $2");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's tickets, most recently booked first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TicketDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.user_id = $1 ORDER BY t.booked_at DESC, t.id DESC");
        sqlx::query_as::<_, TicketDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Tickets issued for an event, in booking order.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<TicketDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.event_id = $1 ORDER BY t.booked_at, t.id");
        sqlx::query_as::<_, TicketDetail>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Count all tickets.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
            .fetch_one(pool)
            .await
    }
}
