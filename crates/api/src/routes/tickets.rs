use axum::routing::get;
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`. Callers only ever see their own tickets.
///
/// ```text
/// GET /           -> list_my_tickets
/// GET /{id}       -> get_ticket
/// GET /{id}/qr    -> download_qr
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_my_tickets))
        .route("/{id}", get(tickets::get_ticket))
        .route("/{id}/qr", get(tickets::download_qr))
}
