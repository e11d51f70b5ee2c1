//! Route definitions for the `/departments` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::departments;
use crate::state::AppState;

/// Routes mounted at `/departments`.
///
/// Listing is public; everything else needs `ManageDepartments`.
///
/// ```text
/// GET    /        -> list_departments
/// POST   /        -> create_department
/// GET    /{id}    -> get_department
/// PUT    /{id}    -> update_department
/// DELETE /{id}    -> delete_department
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
}
