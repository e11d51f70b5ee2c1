//! Super admin user management under `/admin/users`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use unishow_core::error::CoreError;
use unishow_core::roles::{Capability, Role};
use unishow_core::system_log::{titles, LogType};
use unishow_core::types::DbId;
use unishow_core::validation::{validate_password_confirmation, validate_username};
use unishow_db::models::user::{UpdateUser, UserResponse};
use unishow_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use super::auth::{prepare_account, NewAccount, RegisterRequest};
use super::{choice_filter, load_user, non_blank, require_department};
use crate::audit;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
}

/// Request body for `PUT /admin/users/{id}`. Any role may be assigned here.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub role: Option<String>,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub new_password_confirm: String,
}

/// GET /api/v1/admin/users?role=&search=
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    auth.require(Capability::ManageUsers)?;
    let role = choice_filter(query.role.as_deref());
    let search = non_blank(query.search);
    let users = UserRepo::list(&state.pool, role.as_deref(), search.as_deref()).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/admin/users
///
/// Same rules as public registration, but the caller stays signed in as
/// themselves.
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    auth.require(Capability::ManageUsers)?;
    input.validate()?;

    let create_dto = prepare_account(
        &state,
        NewAccount {
            username: &input.username,
            password: &input.password,
            password_confirm: &input.password_confirm,
            role: &input.role,
            enrollment_no: input.enrollment_no.clone(),
            department_id: input.department_id,
            profile_image: input.profile_image.clone(),
            email: input.email.clone(),
        },
    )
    .await?;
    let user = UserRepo::create(&state.pool, &create_dto).await?;

    audit::info(
        &state.pool,
        LogType::Admin,
        titles::USER_CREATED,
        Some(auth.user_id),
        format!("User {} created with role {}", user.username, user.role),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.require(Capability::ManageUsers)?;
    let user = load_user(&state, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AdminUpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.require(Capability::ManageUsers)?;
    input.validate()?;

    if let Some(username) = input.username.as_deref() {
        validate_username(username)?;
    }
    let role = match input.role.as_deref() {
        Some(r) => Some(r.trim().parse::<Role>()?.as_str().to_string()),
        None => None,
    };
    if let Some(department_id) = input.department_id {
        require_department(&state, department_id).await?;
    }

    let update = UpdateUser {
        username: input.username.map(|s| s.trim().to_string()),
        email: input.email.map(|s| s.trim().to_string()),
        role,
        enrollment_no: non_blank(input.enrollment_no),
        department_id: input.department_id,
        profile_image: None,
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    audit::info(
        &state.pool,
        LogType::Admin,
        titles::USER_UPDATED,
        Some(auth.user_id),
        format!("User {} updated", user.username),
    )
    .await;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Sets a new password and signs the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    auth.require(Capability::ManageUsers)?;
    validate_password_confirmation(&input.new_password, &input.new_password_confirm)?;
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let user = load_user(&state, id).await?;
    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, id, &password_hash).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, revoked_sessions = revoked, "Password reset");
    audit::info(
        &state.pool,
        LogType::Admin,
        titles::PASSWORD_RESET,
        Some(auth.user_id),
        format!("Password reset for {}", user.username),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
