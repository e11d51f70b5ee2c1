//! Handlers for booking and viewing tickets.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use unishow_core::error::CoreError;
use unishow_core::roles::Capability;
use unishow_core::system_log::{titles, LogType};
use unishow_core::ticketing::qr_download_name;
use unishow_core::types::DbId;
use unishow_db::models::ticket::TicketDetail;
use unishow_db::repositories::TicketRepo;

use super::load_user;
use crate::audit;
use crate::booking::book_ticket;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Load a ticket owned by the caller. Someone else's ticket is 403.
async fn load_own_ticket(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<TicketDetail> {
    let ticket = TicketRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Ticket", id }))?;
    if ticket.ticket.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only view your own tickets".into(),
        )));
    }
    Ok(ticket)
}

/// POST /api/v1/events/{id}/book
pub async fn book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<MessageResponse<TicketDetail>>)> {
    auth.require(Capability::BookTicket)?;
    let holder = load_user(&state, auth.user_id).await?;

    let (ticket, event) =
        book_ticket(&state.pool, &state.config.media_root, &holder, event_id).await?;

    audit::info(
        &state.pool,
        LogType::Event,
        titles::TICKET_BOOKED,
        Some(holder.id),
        format!("{} booked a ticket for '{}'", holder.username, event.title),
    )
    .await;

    let detail = TicketDetail {
        ticket,
        event_title: event.title,
        event_starts_at: event.starts_at,
        event_location: event.location,
        username: holder.username,
    };
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Ticket booked successfully!",
            data: detail,
        }),
    ))
}

/// GET /api/v1/tickets
pub async fn list_my_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<TicketDetail>>>> {
    let tickets = TicketRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let ticket = load_own_ticket(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// GET /api/v1/tickets/{id}/qr
///
/// Streams the stored PNG as a download.
pub async fn download_qr(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = load_own_ticket(&state, &auth, id).await?;
    if detail.ticket.qr_code.is_empty() {
        return Err(AppError::Core(CoreError::NotFound { entity: "QR code", id }));
    }

    let path = state.config.media_root.join(&detail.ticket.qr_code);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::InternalError(format!("Reading {}: {e}", path.display())))?;

    let file_name = qr_download_name(&detail.username, detail.ticket.event_id);
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
