//! Route definitions for the `/dashboard` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /             -> index
/// GET /student      -> student
/// GET /admin        -> admin
/// GET /superadmin   -> superadmin
/// GET /events       -> filter_events
/// GET /users        -> filter_users
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/student", get(dashboard::student))
        .route("/admin", get(dashboard::admin))
        .route("/superadmin", get(dashboard::superadmin))
        .route("/events", get(dashboard::filter_events))
        .route("/users", get(dashboard::filter_users))
}
