//! `GET /health`: reports the database and the media root that QR codes and
//! backups are written to. Either one failing answers `503` with
//! `status: "degraded"`.

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use unishow_core::types::Timestamp;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Media root exists and is a writable directory.
    pub media_writable: bool,
    pub checked_at: Timestamp,
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = unishow_db::health_check(&state.pool).await.is_ok();
    let media_writable = media_root_writable(&state.config.media_root).await;

    let (code, status) = if db_healthy && media_writable {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!(db_healthy, media_writable, "Health check degraded");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            media_writable,
            checked_at: chrono::Utc::now(),
        }),
    )
}

async fn media_root_writable(root: &Path) -> bool {
    match tokio::fs::metadata(root).await {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        Err(_) => false,
    }
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
