//! Refresh-token sessions.

use sqlx::FromRow;
use unishow_core::types::{DbId, Timestamp};

/// One issued refresh token, stored by digest.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Set when the token was rotated or the user signed out.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserSession {
    /// Whether the token can still be exchanged at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
