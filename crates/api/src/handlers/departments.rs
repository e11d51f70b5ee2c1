//! Handlers for the `/departments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use unishow_core::error::CoreError;
use unishow_core::roles::Capability;
use unishow_core::system_log::{titles, LogType};
use unishow_core::types::DbId;
use unishow_core::validation::{
    validate_department, validate_required, MAX_DEPARTMENT_CODE_LEN, MAX_DEPARTMENT_NAME_LEN,
};
use unishow_db::models::department::{CreateDepartment, Department, UpdateDepartment};
use unishow_db::models::user::UserResponse;
use unishow_db::repositories::{DepartmentRepo, UserRepo};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A department together with its members.
#[derive(Debug, Serialize)]
pub struct DepartmentDetail {
    #[serde(flatten)]
    pub department: Department,
    pub users: Vec<UserResponse>,
    /// Whether any of its events are still to come.
    pub has_active_events: bool,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Department",
        id,
    })
}

/// GET /api/v1/departments
///
/// Public: the registration form needs the list.
pub async fn list_departments(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Department>>>> {
    let departments = DepartmentRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: departments }))
}

/// POST /api/v1/departments
pub async fn create_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateDepartment>,
) -> AppResult<(StatusCode, Json<DataResponse<Department>>)> {
    auth.require(Capability::ManageDepartments)?;
    validate_department(&input.name, &input.code)?;

    let department = DepartmentRepo::create(&state.pool, &input).await?;
    audit::info(
        &state.pool,
        LogType::Admin,
        titles::DEPARTMENT_CREATED,
        Some(auth.user_id),
        format!("Department {} ({}) created", department.name, department.code),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: department })))
}

/// GET /api/v1/departments/{id}
pub async fn get_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DepartmentDetail>>> {
    auth.require(Capability::ManageDepartments)?;

    let department = DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let users = UserRepo::list_by_department(&state.pool, id).await?;
    let has_active_events = DepartmentRepo::has_active_events(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: DepartmentDetail {
            department,
            users: users.iter().map(UserResponse::from).collect(),
            has_active_events,
        },
    }))
}

/// PUT /api/v1/departments/{id}
pub async fn update_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDepartment>,
) -> AppResult<Json<DataResponse<Department>>> {
    auth.require(Capability::ManageDepartments)?;
    if let Some(name) = input.name.as_deref() {
        validate_required("Name", name, MAX_DEPARTMENT_NAME_LEN)?;
    }
    if let Some(code) = input.code.as_deref() {
        validate_required("Code", code, MAX_DEPARTMENT_CODE_LEN)?;
    }

    let update = UpdateDepartment {
        name: input.name.map(|s| s.trim().to_string()),
        code: input.code.map(|s| s.trim().to_string()),
    };
    let department = DepartmentRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;

    audit::info(
        &state.pool,
        LogType::Admin,
        titles::DEPARTMENT_UPDATED,
        Some(auth.user_id),
        format!("Department {} ({}) updated", department.name, department.code),
    )
    .await;

    Ok(Json(DataResponse { data: department }))
}

/// DELETE /api/v1/departments/{id}
///
/// The department's events (and their tickets) go with it.
pub async fn delete_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Capability::ManageDepartments)?;

    let department = DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !DepartmentRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    audit::info(
        &state.pool,
        LogType::Admin,
        titles::DEPARTMENT_DELETED,
        Some(auth.user_id),
        format!("Department {} ({}) deleted", department.name, department.code),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
