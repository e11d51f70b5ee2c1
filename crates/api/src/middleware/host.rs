//! `Host` header allow-list.

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Reject requests whose `Host` is not covered by `ALLOWED_HOSTS`.
///
/// Mount with `axum::middleware::from_fn_with_state`.
pub async fn allowed_host_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();

    if host_allowed(&host, &state.config.allowed_hosts) {
        next.run(request).await
    } else {
        tracing::warn!(host = %host, "Rejected request for disallowed host");
        AppError::DisallowedHost(host).into_response()
    }
}

/// Whether `host` (optionally with a port) matches one of the `allowed` patterns.
///
/// Patterns are exact host names, `*` for any host, or `.example.edu` for the
/// domain and all of its subdomains. Comparison is case-insensitive.
pub fn host_allowed(host: &str, allowed: &[String]) -> bool {
    let name = strip_port(host).to_ascii_lowercase();
    if name.is_empty() {
        return false;
    }
    allowed.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        if pattern == "*" {
            true
        } else if let Some(domain) = pattern.strip_prefix('.') {
            name == domain || name.ends_with(&pattern)
        } else {
            name == pattern
        }
    })
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        // IPv6 literal: keep the brackets' contents.
        return rest.split(']').next().unwrap_or_default();
    }
    host.split(':').next().unwrap_or_default()
}
