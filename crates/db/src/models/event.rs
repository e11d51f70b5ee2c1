//! Event entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use unishow_core::types::{DbId, Timestamp};

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
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

/// An event joined with its department name and ticket counts.
///
/// `tickets_left` is signed: a restore can leave more tickets than capacity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub department_name: String,
    pub tickets_issued: i64,
    pub tickets_left: i64,
    pub is_free: bool,
}

/// DTO for creating a new event.
#[derive(Debug)]
pub struct CreateEvent {
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
}

/// DTO for updating an existing event. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub available_tickets: Option<i32>,
    pub ticket_price: Option<f64>,
    pub category: Option<String>,
    pub department_id: Option<DbId>,
}

/// Filters for event listings. Every field narrows the result when set.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub starts_from: Option<Timestamp>,
    pub starts_before: Option<Timestamp>,
    pub created_by: Option<DbId>,
}
