//! Server configuration, read once at startup and validated.

use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS, DEFAULT_REFRESH_EXPIRY_DAYS};

/// Why the environment could not be turned into a [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Pretty logs when `true`, JSON logs otherwise.
    pub debug: bool,
    /// Accepted `Host` header values. `*` accepts any host; a leading dot
    /// matches the domain and all of its subdomains.
    pub allowed_hosts: Vec<String>,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Root directory for QR codes and backup files.
    pub media_root: PathBuf,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `DATABASE_URL`            | required                |
    /// | `SECRET_KEY`/`JWT_SECRET` | required                |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | `15`                    |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | `7`                     |
    /// | `DEBUG`                   | `false`                 |
    /// | `ALLOWED_HOSTS`           | `localhost,127.0.0.1`   |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `MEDIA_ROOT`              | `./media`               |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", get("PORT"), 3000u16)?;

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let secret = get("SECRET_KEY")
            .or_else(|| get("JWT_SECRET"))
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;
        let access_token_expiry_mins = parse_or(
            "JWT_ACCESS_EXPIRY_MINS",
            get("JWT_ACCESS_EXPIRY_MINS"),
            DEFAULT_ACCESS_EXPIRY_MINS,
        )?;
        let refresh_token_expiry_days = parse_or(
            "JWT_REFRESH_EXPIRY_DAYS",
            get("JWT_REFRESH_EXPIRY_DAYS"),
            DEFAULT_REFRESH_EXPIRY_DAYS,
        )?;
        if access_token_expiry_mins <= 0 || refresh_token_expiry_days <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_ACCESS_EXPIRY_MINS",
                value: format!("{access_token_expiry_mins}/{refresh_token_expiry_days}"),
                reason: "token lifetimes must be positive".into(),
            });
        }

        let debug = match get("DEBUG") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                var: "DEBUG",
                value: v.clone(),
                reason: "expected true/false".into(),
            })?,
        };

        let allowed_hosts =
            split_list(get("ALLOWED_HOSTS").as_deref().unwrap_or("localhost,127.0.0.1"));
        if allowed_hosts.is_empty() {
            return Err(ConfigError::Invalid {
                var: "ALLOWED_HOSTS",
                value: String::new(),
                reason: "at least one host is required".into(),
            });
        }

        let cors_origins =
            split_list(get("CORS_ORIGINS").as_deref().unwrap_or("http://localhost:5173"));
        for origin in &cors_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: "not a valid header value".into(),
                });
            }
        }

        let media_root = PathBuf::from(get("MEDIA_ROOT").unwrap_or_else(|| "./media".into()));
        let request_timeout_secs =
            parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30u64)?;

        Ok(Self {
            host,
            port,
            database_url,
            debug,
            allowed_hosts,
            cors_origins,
            media_root,
            request_timeout_secs,
            jwt: JwtConfig {
                secret,
                access_token_expiry_mins,
                refresh_token_expiry_days,
            },
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: v.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
