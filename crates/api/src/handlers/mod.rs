//! HTTP handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod backup;
pub mod dashboard;
pub mod departments;
pub mod events;
pub mod logs;
pub mod me;
pub mod tickets;

use unishow_core::error::CoreError;
use unishow_core::types::DbId;
use unishow_db::models::department::Department;
use unishow_db::models::user::User;
use unishow_db::repositories::{DepartmentRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a user row or fail with 404.
pub(crate) async fn load_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Resolve a department chosen in a form. Unknown ids are a validation error,
/// not a 404, since the department is an input field.
pub(crate) async fn require_department(state: &AppState, id: DbId) -> AppResult<Department> {
    DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Select a valid department.".into(),
            ))
        })
}

/// Normalise an optional choice filter from a query string.
///
/// Blank values and `all` (any case) disable the filter.
pub(crate) fn choice_filter(value: Option<&str>) -> Option<String> {
    let v = value?.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(v.to_ascii_lowercase())
    }
}

/// Trim an optional free-text field, mapping blank to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
