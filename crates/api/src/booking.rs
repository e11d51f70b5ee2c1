//! Ticket issuance.
//!
//! The whole booking runs in one transaction that starts by locking the event
//! row, so concurrent requests for the same event are handled one at a time
//! and capacity and the one-ticket-per-user rule hold under contention.

use std::path::Path;

use sqlx::{Postgres, Transaction};
use unishow_core::error::CoreError;
use unishow_core::ticketing::{
    check_booking, is_free, qr_relative_path, render_qr_png, QrPayload,
};
use unishow_core::types::DbId;
use unishow_db::models::event::Event;
use unishow_db::models::ticket::Ticket;
use unishow_db::models::user::User;
use unishow_db::repositories::TicketRepo;
use unishow_db::DbPool;

use crate::error::{AppError, AppResult};

/// Issue a ticket for `event_id` to `holder` and render its QR code under
/// `media_root`.
///
/// Returns the stored ticket and the event it was booked for.
pub async fn book_ticket(
    pool: &DbPool,
    media_root: &Path,
    holder: &User,
    event_id: DbId,
) -> AppResult<(Ticket, Event)> {
    let mut tx = pool.begin().await?;

    let event = TicketRepo::lock_event(&mut tx, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    let already_booked = TicketRepo::exists_for(&mut tx, event.id, holder.id).await?;
    let issued = TicketRepo::count_for_event(&mut tx, event.id).await?;
    check_booking(already_booked, event.available_tickets, issued).map_err(CoreError::from)?;

    if !is_free(event.ticket_price) {
        tracing::debug!(
            event_id = event.id,
            user_id = holder.id,
            price = event.ticket_price,
            "No payment step configured; issuing paid ticket directly",
        );
    }

    let ticket = TicketRepo::insert(&mut tx, event.id, holder.id).await?;

    let payload = QrPayload::new(
        &holder.username,
        holder.enrollment_no.as_deref(),
        &event.title,
        Some(event.starts_at),
        ticket.booked_at,
    );
    let png = render_qr_png(&payload)?;
    let relative = qr_relative_path(ticket.id);
    write_media_file(media_root, &relative, &png).await?;

    let ticket = match store_qr_and_commit(tx, ticket.id, &relative).await {
        Ok(ticket) => ticket,
        Err(e) => {
            remove_media_file(media_root, &relative).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        ticket_id = ticket.id,
        event_id = event.id,
        user_id = holder.id,
        "Ticket issued",
    );
    Ok((ticket, event))
}

async fn store_qr_and_commit(
    mut tx: Transaction<'static, Postgres>,
    ticket_id: DbId,
    relative: &str,
) -> Result<Ticket, sqlx::Error> {
    let ticket = TicketRepo::set_qr_code(&mut tx, ticket_id, relative).await?;
    tx.commit().await?;
    Ok(ticket)
}

/// Drop the QR file of a ticket that was rolled back.
async fn remove_media_file(media_root: &Path, relative: &str) {
    let path = media_root.join(relative);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned QR file");
    }
}

async fn write_media_file(media_root: &Path, relative: &str, bytes: &[u8]) -> AppResult<()> {
    let path = media_root.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::InternalError(format!("Creating {}: {e}", parent.display())))?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Writing {}: {e}", path.display())))
}
