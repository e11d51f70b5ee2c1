//! Ticket entity model.

use serde::Serialize;
use sqlx::FromRow;
use unishow_core::types::{DbId, Timestamp};

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub booked_at: Timestamp,
    /// Media-relative path of the QR PNG. Empty until rendered.
    pub qr_code: String,
}

/// A ticket joined with its event and holder.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub event_title: String,
    pub event_starts_at: Timestamp,
    pub event_location: String,
    pub username: String,
}
