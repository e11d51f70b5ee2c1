//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use unishow_core::error::CoreError;
use unishow_core::roles::Role;
use unishow_core::system_log::{titles, LogType};
use unishow_core::types::DbId;
use unishow_core::validation::{
    validate_password_confirmation, validate_registration, validate_username,
};
use unishow_db::models::session::CreateSession;
use unishow_db::models::user::{CreateUser, User};
use unishow_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use super::{non_blank, require_department};
use crate::audit;
use crate::auth::jwt::{generate_access_token, hash_refresh_token, issue_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    /// `student` or `admin`.
    pub role: String,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Shared validation
// ---------------------------------------------------------------------------

/// Fields shared by self-registration and admin-created accounts.
pub(crate) struct NewAccount<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
    pub role: &'a str,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
    pub email: String,
}

/// Validate a new account and build its insert DTO (password hashed).
pub(crate) async fn prepare_account(
    state: &AppState,
    account: NewAccount<'_>,
) -> AppResult<CreateUser> {
    validate_username(account.username)?;
    let role: Role = account.role.trim().parse()?;
    let enrollment_no = non_blank(account.enrollment_no);
    validate_registration(role, enrollment_no.as_deref(), account.department_id)?;
    validate_password_confirmation(account.password, account.password_confirm)?;
    validate_password_strength(account.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    if let Some(department_id) = account.department_id {
        require_department(state, department_id).await?;
    }

    let password_hash = hash_password(account.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    Ok(CreateUser {
        username: account.username.trim().to_string(),
        email: account.email.trim().to_string(),
        password_hash,
        role: role.as_str().to_string(),
        enrollment_no,
        department_id: account.department_id,
        profile_image: non_blank(account.profile_image),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Public sign-up for students and event admins. Signs the new user in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
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
    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    audit::info(
        &state.pool,
        LogType::User,
        titles::USER_REGISTERED,
        Some(user.id),
        format!("{} registered as {}", user.username, user.role),
    )
    .await;

    let response = create_auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username (or email) + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username_or_email(&state.pool, input.username.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let new_count = user.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    // The presented token is single-use: consuming it revokes the session.
    let session = SessionRepo::consume(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let role: Role = user.role.parse()?;
    let access_token = generate_access_token(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = issue_refresh_token(&state.config.jwt);
    let session_input = CreateSession {
        user_id: user.id,
        refresh_token_hash: refresh.hash,
        expires_at: refresh.expires_at,
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role,
        },
    })
}
