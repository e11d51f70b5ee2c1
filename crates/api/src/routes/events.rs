//! Route definitions for the `/events` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{events, tickets};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// POST   /                -> create_event
/// POST   /suggest         -> suggest_event
/// GET    /{id}            -> get_event (public, personalised when signed in)
/// PUT    /{id}            -> update_event
/// DELETE /{id}            -> delete_event
/// POST   /{id}/book       -> book
/// GET    /{id}/tickets    -> list_event_tickets
/// GET    /{id}/memories   -> event_memories
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(events::create_event))
        .route("/suggest", post(events::suggest_event))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/book", post(tickets::book))
        .route("/{id}/tickets", get(events::list_event_tickets))
        .route("/{id}/memories", get(events::event_memories))
}
