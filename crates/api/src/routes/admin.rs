//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, backup, logs};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the super admin role (checked in each handler).
///
/// ```text
/// GET  /users                       -> list_users
/// POST /users                       -> create_user
/// GET  /users/{id}                  -> get_user
/// PUT  /users/{id}                  -> update_user
/// POST /users/{id}/reset-password   -> reset_password
/// GET  /logs                        -> list_logs
/// GET  /backup                      -> list_backups
/// POST /backup                      -> run_backup_action
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", get(admin::get_user).put(admin::update_user))
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route("/logs", get(logs::list_logs))
        .route(
            "/backup",
            get(backup::list_backups).post(backup::run_backup_action),
        )
}
