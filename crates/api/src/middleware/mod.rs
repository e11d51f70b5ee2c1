//! Request guards.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token
//!   and checks capabilities against the role table.
//! - [`host::allowed_host_guard`] -- Rejects requests for hosts outside `ALLOWED_HOSTS`.

pub mod auth;
pub mod host;
