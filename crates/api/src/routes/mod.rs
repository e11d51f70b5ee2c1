pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod departments;
pub mod events;
pub mod health;
pub mod me;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /me                                              get, update own profile
///
/// /departments                                     list (public), create
/// /departments/{id}                                get, update, delete
///
/// /events                                          create
/// /events/suggest                                  suggest (any role)
/// /events/{id}                                     get (public), update, delete
/// /events/{id}/book                                book a ticket (POST)
/// /events/{id}/tickets                             tickets issued for the event
/// /events/{id}/memories                            post-event view
///
/// /tickets                                         caller's tickets
/// /tickets/{id}                                    ticket detail (owner)
/// /tickets/{id}/qr                                 QR PNG download (owner)
///
/// /dashboard                                       which dashboard to show
/// /dashboard/student                               student dashboard
/// /dashboard/admin                                 event admin dashboard
/// /dashboard/superadmin                            super admin dashboard
/// /dashboard/events                                filtered events
/// /dashboard/users                                 filtered users
///
/// /admin/users                                     list, create (super admin)
/// /admin/users/{id}                                get, update
/// /admin/users/{id}/reset-password                 reset password
/// /admin/logs                                      system log viewer
/// /admin/backup                                    list, create/restore
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/departments", departments::router())
        .nest("/events", events::router())
        .nest("/tickets", tickets::router())
        .nest("/dashboard", dashboard::router())
        .nest("/admin", admin::router())
}
