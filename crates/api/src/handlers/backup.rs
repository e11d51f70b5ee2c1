//! Backup management under `/admin/backup`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use unishow_core::backup::BackupAction;
use unishow_core::error::CoreError;
use unishow_core::roles::Capability;
use unishow_core::system_log::{titles, LogLevel, LogType};
use unishow_db::models::backup::{BackupStats, SystemBackup};
use unishow_db::repositories::BackupRepo;

use crate::audit;
use crate::backup::{create_backup, restore_backup};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Request body for `POST /admin/backup`.
#[derive(Debug, Deserialize)]
pub struct BackupRequest {
    pub action: BackupAction,
    /// Required for `restore_backup`.
    pub backup_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BackupListResponse {
    pub data: Vec<SystemBackup>,
    #[serde(flatten)]
    pub stats: BackupStats,
}

/// GET /api/v1/admin/backup
pub async fn list_backups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<BackupListResponse>> {
    auth.require(Capability::ManageBackups)?;
    let backups = BackupRepo::list(&state.pool).await?;
    let stats = BackupRepo::stats(&state.pool).await?;
    Ok(Json(BackupListResponse {
        data: backups,
        stats,
    }))
}

/// POST /api/v1/admin/backup
///
/// Failures are written to the system log before the error is returned.
pub async fn run_backup_action(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BackupRequest>,
) -> AppResult<Response> {
    auth.require(Capability::ManageBackups)?;

    match input.action {
        BackupAction::CreateBackup => {
            let backup = match create_backup(&state.pool, &state.config.media_root, auth.user_id)
                .await
            {
                Ok(backup) => backup,
                Err(e) => {
                    audit::record(
                        &state.pool,
                        LogLevel::Error,
                        LogType::System,
                        titles::BACKUP_FAILED,
                        Some(auth.user_id),
                        e.to_string(),
                    )
                    .await;
                    return Err(e.into());
                }
            };

            audit::info(
                &state.pool,
                LogType::System,
                titles::BACKUP_CREATED,
                Some(auth.user_id),
                format!("Backup {} created successfully", backup.backup_id),
            )
            .await;

            Ok((
                StatusCode::CREATED,
                Json(MessageResponse {
                    message: "Backup created successfully!",
                    data: backup,
                }),
            )
                .into_response())
        }
        BackupAction::RestoreBackup => {
            let backup_id = input
                .backup_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(
                        "backup_id is required to restore a backup.".into(),
                    ))
                })?;

            let summary = match restore_backup(&state.pool, backup_id, auth.user_id).await {
                Ok(summary) => summary,
                Err(e) => {
                    audit::record(
                        &state.pool,
                        LogLevel::Error,
                        LogType::System,
                        titles::RESTORE_FAILED,
                        Some(auth.user_id),
                        e.to_string(),
                    )
                    .await;
                    return Err(e.into());
                }
            };

            audit::info(
                &state.pool,
                LogType::System,
                titles::BACKUP_RESTORED,
                Some(auth.user_id),
                format!("Backup {backup_id} restored successfully"),
            )
            .await;

            Ok(Json(MessageResponse {
                message: "Backup restored successfully!",
                data: summary,
            })
            .into_response())
        }
    }
}
