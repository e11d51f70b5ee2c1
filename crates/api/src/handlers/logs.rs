//! System log viewer.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use unishow_core::roles::Capability;
use unishow_core::system_log::{
    normalize_choice_filter, normalize_search, DateRange, LogLevel, LogType,
};
use unishow_db::models::system_log::{SystemLogEntry, SystemLogQuery};
use unishow_db::repositories::SystemLogRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogFilterParams {
    pub date_range: Option<String>,
    pub log_level: Option<String>,
    pub log_type: Option<String>,
    pub search: Option<String>,
}

/// A `(value, label)` pair for filter drop-downs.
#[derive(Debug, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub data: Vec<SystemLogEntry>,
    pub log_levels: Vec<Choice>,
    pub log_types: Vec<Choice>,
}

/// GET /api/v1/admin/logs
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<LogFilterParams>,
) -> AppResult<Json<LogListResponse>> {
    auth.require(Capability::ViewSystemLogs)?;

    let query = SystemLogQuery {
        since: params
            .date_range
            .as_deref()
            .and_then(DateRange::parse)
            .map(|range| range.cutoff(Utc::now())),
        level: normalize_choice_filter(params.log_level.as_deref()),
        log_type: normalize_choice_filter(params.log_type.as_deref()),
        search: normalize_search(params.search.as_deref()),
    };
    let entries = SystemLogRepo::query(&state.pool, &query).await?;

    Ok(Json(LogListResponse {
        data: entries,
        log_levels: LogLevel::ALL
            .iter()
            .map(|l| Choice {
                value: l.as_str(),
                label: l.label(),
            })
            .collect(),
        log_types: LogType::ALL
            .iter()
            .map(|t| Choice {
                value: t.as_str(),
                label: t.label(),
            })
            .collect(),
    }))
}
