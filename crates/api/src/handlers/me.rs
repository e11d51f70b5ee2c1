//! Handlers for the caller's own profile (`/me`).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use unishow_core::error::CoreError;
use unishow_core::system_log::{titles, LogType};
use unishow_core::types::DbId;
use unishow_core::validation::{validate_required, MAX_ENROLLMENT_NO_LEN};
use unishow_db::models::user::{UpdateUser, UserResponse};
use unishow_db::repositories::UserRepo;
use validator::Validate;

use super::{load_user, non_blank, require_department};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fields a user may change on their own profile.
///
/// Username and role are fixed after registration.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
}

/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let enrollment_no = non_blank(input.enrollment_no);
    if let Some(no) = enrollment_no.as_deref() {
        validate_required("Enrollment number", no, MAX_ENROLLMENT_NO_LEN)?;
    }
    if let Some(department_id) = input.department_id {
        require_department(&state, department_id).await?;
    }

    let update = UpdateUser {
        email: input.email.map(|e| e.trim().to_string()),
        enrollment_no,
        department_id: input.department_id,
        profile_image: non_blank(input.profile_image),
        ..Default::default()
    };

    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    audit::info(
        &state.pool,
        LogType::User,
        titles::USER_UPDATED,
        Some(user.id),
        format!("{} updated their profile", user.username),
    )
    .await;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
