//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use unishow_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Role name; parse with `unishow_core::roles::Role::from_str`.
    pub role: String,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            enrollment_no: user.enrollment_no.clone(),
            department_id: user.department_id,
            profile_image: user.profile_image.clone(),
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub enrollment_no: Option<String>,
    pub department_id: Option<DbId>,
    pub profile_image: Option<String>,
    pub is_active: Option<bool>,
}
