//! Session tokens.
//!
//! A signed-in user holds a short-lived HS256 access token naming their id
//! and role, plus an opaque refresh token. The database keeps only the
//! refresh token's SHA-256 digest; [`hash_refresh_token`] recomputes it on
//! `/auth/refresh`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unishow_core::roles::Role;
use unishow_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// `iss` claim stamped on and required of every access token.
pub const TOKEN_ISSUER: &str = "unishow";

pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
pub const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Access-token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Role at sign-in. A role change takes effect on the next refresh.
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Signing secret and token lifetimes, loaded by [`crate::config::ServerConfig`].
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Access-token lifetime in seconds, as reported in `expires_in`.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// A freshly issued refresh token. Hand `plaintext` to the client and store
/// `hash` with `expires_at`.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
    pub expires_at: Timestamp,
}

/// Sign an access token for `user_id` acting as `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        iss: TOKEN_ISSUER.to_string(),
        iat: now,
        exp: now + config.access_token_ttl_secs(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, then return the claims.
///
/// Tokens naming a role outside [`Role`] fail to decode.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Issue a refresh token valid for the configured number of days.
pub fn issue_refresh_token(config: &JwtConfig) -> RefreshToken {
    let plaintext = Uuid::new_v4().simple().to_string();
    RefreshToken {
        hash: hash_refresh_token(&plaintext),
        expires_at: Utc::now() + Duration::days(config.refresh_token_expiry_days),
        plaintext,
    }
}

/// Hex SHA-256 digest under which a refresh token is stored.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
