//! Handlers for the `/events` resource.
//!
//! Staff create and manage events; any signed-in user may suggest one. Event
//! admins may only change events they created, super admins any event.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use unishow_core::error::CoreError;
use unishow_core::roles::{Capability, Role};
use unishow_core::system_log::{titles, LogType};
use unishow_core::types::{DbId, Timestamp};
use unishow_core::validation::{
    validate_capacity, validate_capacity_change, validate_event_schedule, validate_new_event,
    validate_price, validate_required, EventCategory, MAX_EVENT_LOCATION_LEN, MAX_EVENT_TITLE_LEN,
};
use unishow_db::models::event::{CreateEvent, Event, EventWithStats, UpdateEvent};
use unishow_db::models::ticket::{Ticket, TicketDetail};
use unishow_db::repositories::{EventRepo, TicketRepo};

use super::{non_blank, require_department};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /events`.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub location: String,
    pub image: Option<String>,
    pub available_tickets: i32,
    #[serde(default)]
    pub ticket_price: f64,
    pub category: Option<String>,
    pub department_id: DbId,
}

/// Request body for `POST /events/suggest`.
#[derive(Debug, Deserialize)]
pub struct SuggestEventRequest {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub department_id: DbId,
    pub starts_at: Timestamp,
    pub location: String,
}

/// An event as seen by one viewer.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: EventWithStats,
    /// The viewer's ticket, when signed in and booked.
    pub user_ticket: Option<Ticket>,
}

#[derive(Debug, Serialize)]
pub struct EventTickets {
    pub event: EventWithStats,
    pub tickets: Vec<TicketDetail>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Event", id })
}

fn parse_category(category: Option<&str>) -> AppResult<EventCategory> {
    match category.map(str::trim).filter(|s| !s.is_empty()) {
        Some(c) => Ok(EventCategory::parse(c)?),
        None => Ok(EventCategory::default()),
    }
}

/// Load an event the caller is allowed to change.
async fn load_managed_event(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Event> {
    auth.require(Capability::ManageEvents)?;
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if auth.role != Role::SuperAdmin && event.created_by != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only manage events you created".into(),
        )));
    }
    Ok(event)
}

async fn load_with_stats(state: &AppState, id: DbId) -> AppResult<EventWithStats> {
    EventRepo::find_with_stats(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    auth.require(Capability::ManageEvents)?;
    validate_new_event(
        &input.title,
        &input.description,
        &input.location,
        input.starts_at,
        input.available_tickets,
        input.ticket_price,
        Utc::now(),
    )?;
    let category = parse_category(input.category.as_deref())?;
    require_department(&state, input.department_id).await?;

    let create_dto = CreateEvent {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        starts_at: input.starts_at,
        location: input.location.trim().to_string(),
        image: non_blank(input.image),
        available_tickets: input.available_tickets,
        ticket_price: input.ticket_price,
        category: category.as_str().to_string(),
        department_id: input.department_id,
        created_by: auth.user_id,
    };
    let event = EventRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(event_id = event.id, user_id = auth.user_id, "Event created");
    audit::info(
        &state.pool,
        LogType::Event,
        titles::EVENT_CREATED,
        Some(auth.user_id),
        format!("Event '{}' created", event.title),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// POST /api/v1/events/suggest
///
/// A suggestion is stored as an event with no tickets and no price; staff
/// raise the capacity when they adopt it.
pub async fn suggest_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SuggestEventRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    auth.require(Capability::SuggestEvent)?;
    validate_required("Title", &input.title, MAX_EVENT_TITLE_LEN)?;
    validate_required("Description", &input.description, usize::MAX)?;
    validate_required("Location", &input.location, MAX_EVENT_LOCATION_LEN)?;
    validate_event_schedule(input.starts_at, Utc::now())?;
    let category = parse_category(input.category.as_deref())?;
    require_department(&state, input.department_id).await?;

    let create_dto = CreateEvent {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        starts_at: input.starts_at,
        location: input.location.trim().to_string(),
        image: None,
        available_tickets: 0,
        ticket_price: 0.0,
        category: category.as_str().to_string(),
        department_id: input.department_id,
        created_by: auth.user_id,
    };
    let event = EventRepo::create(&state.pool, &create_dto).await?;

    audit::info(
        &state.pool,
        LogType::Event,
        titles::EVENT_SUGGESTED,
        Some(auth.user_id),
        format!("Event '{}' suggested", event.title),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventDetail>>> {
    let event = load_with_stats(&state, id).await?;
    let user_ticket = match auth {
        Some(user) => TicketRepo::find_for_user_and_event(&state.pool, user.user_id, id).await?,
        None => None,
    };

    Ok(Json(DataResponse {
        data: EventDetail { event, user_ticket },
    }))
}

/// PUT /api/v1/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    load_managed_event(&state, &auth, id).await?;

    if let Some(title) = input.title.as_deref() {
        validate_required("Title", title, MAX_EVENT_TITLE_LEN)?;
    }
    if let Some(description) = input.description.as_deref() {
        validate_required("Description", description, usize::MAX)?;
    }
    if let Some(location) = input.location.as_deref() {
        validate_required("Location", location, MAX_EVENT_LOCATION_LEN)?;
    }
    if let Some(starts_at) = input.starts_at {
        validate_event_schedule(starts_at, Utc::now())?;
    }
    if let Some(price) = input.ticket_price {
        validate_price(price)?;
    }
    let category = match input.category.as_deref() {
        Some(c) => Some(EventCategory::parse(c.trim())?.as_str().to_string()),
        None => None,
    };
    if let Some(department_id) = input.department_id {
        require_department(&state, department_id).await?;
    }
    if let Some(capacity) = input.available_tickets {
        validate_capacity(capacity)?;
    }

    let update = UpdateEvent {
        title: input.title.map(|s| s.trim().to_string()),
        description: input.description.map(|s| s.trim().to_string()),
        location: input.location.map(|s| s.trim().to_string()),
        image: non_blank(input.image),
        category,
        ..input
    };

    // Bookings for this event wait on the lock until the new capacity is in.
    let mut tx = state.pool.begin().await?;
    TicketRepo::lock_event(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if let Some(capacity) = update.available_tickets {
        let issued = TicketRepo::count_for_event(&mut tx, id).await?;
        validate_capacity_change(capacity, issued)?;
    }
    let event = EventRepo::update(&mut tx, id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    audit::info(
        &state.pool,
        LogType::Event,
        titles::EVENT_UPDATED,
        Some(auth.user_id),
        format!("Event '{}' updated", event.title),
    )
    .await;

    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Tickets for the event are removed with it.
pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let event = load_managed_event(&state, &auth, id).await?;
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(event_id = id, user_id = auth.user_id, "Event deleted");
    audit::info(
        &state.pool,
        LogType::Event,
        titles::EVENT_DELETED,
        Some(auth.user_id),
        format!("Event '{}' deleted", event.title),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/events/{id}/tickets
pub async fn list_event_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventTickets>>> {
    auth.require(Capability::ManageEvents)?;
    let event = load_with_stats(&state, id).await?;
    let tickets = TicketRepo::list_for_event(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: EventTickets { event, tickets },
    }))
}

/// GET /api/v1/events/{id}/memories
///
/// Only available once the event has started.
pub async fn event_memories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventWithStats>>> {
    let event = load_with_stats(&state, id).await?;
    if event.event.starts_at > Utc::now() {
        return Err(AppError::BadRequest(
            "Event memories are only available after the event has ended.".into(),
        ));
    }
    Ok(Json(DataResponse { data: event }))
}
