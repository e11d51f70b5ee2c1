//! Role dashboards and the staff listing filters.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use unishow_core::roles::{Capability, Role};
use unishow_core::types::Timestamp;
use unishow_db::models::department::Department;
use unishow_db::models::event::{EventFilter, EventWithStats};
use unishow_db::models::user::{User, UserResponse};
use unishow_db::repositories::{DepartmentRepo, EventRepo, TicketRepo, UserRepo};

use super::{choice_filter, non_blank};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query string shared by the dashboard endpoints. Unused keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub role: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardIndex {
    pub role: Role,
    pub dashboard: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub events: Vec<EventWithStats>,
    pub past_events: Vec<EventWithStats>,
    pub attended_events: Vec<EventWithStats>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_events: i64,
    pub total_bookings: i64,
    pub upcoming_events: i64,
    pub events: Vec<EventWithStats>,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct SuperAdminDashboard {
    pub departments: Vec<Department>,
    pub users: Vec<UserResponse>,
    pub events: Vec<EventWithStats>,
    pub total_departments: i64,
    pub total_users: i64,
    pub total_events: i64,
    pub total_bookings: i64,
}

/// Midnight UTC of the current day.
fn start_of_today() -> Timestamp {
    Utc::now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

fn to_responses(users: &[User]) -> Vec<UserResponse> {
    users.iter().map(UserResponse::from).collect()
}

/// GET /api/v1/dashboard
///
/// Names the dashboard the caller should be sent to.
pub async fn index(auth: AuthUser) -> Json<DataResponse<DashboardIndex>> {
    let dashboard = match auth.role {
        Role::Student => "student",
        Role::Admin => "admin",
        Role::SuperAdmin => "superadmin",
    };
    Json(DataResponse {
        data: DashboardIndex {
            role: auth.role,
            dashboard,
        },
    })
}

/// GET /api/v1/dashboard/student
pub async fn student(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<StudentDashboard>>> {
    auth.require(Capability::ViewStudentDashboard)?;
    let today = start_of_today();

    let events = EventRepo::list(
        &state.pool,
        &EventFilter {
            starts_from: Some(today),
            ..Default::default()
        },
    )
    .await?;
    let past_events = EventRepo::list(
        &state.pool,
        &EventFilter {
            starts_before: Some(today),
            ..Default::default()
        },
    )
    .await?;
    let attended_events = EventRepo::list_attended_by(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: StudentDashboard {
            events,
            past_events,
            attended_events,
        },
    }))
}

/// GET /api/v1/dashboard/admin?role=&category=
pub async fn admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DataResponse<AdminDashboard>>> {
    auth.require(Capability::ViewAdminDashboard)?;
    let role = choice_filter(query.role.as_deref());

    let events = EventRepo::list(
        &state.pool,
        &EventFilter {
            category: choice_filter(query.category.as_deref()),
            ..Default::default()
        },
    )
    .await?;
    let users = UserRepo::list(&state.pool, role.as_deref(), None).await?;

    Ok(Json(DataResponse {
        data: AdminDashboard {
            total_events: EventRepo::count(&state.pool).await?,
            total_bookings: TicketRepo::count(&state.pool).await?,
            upcoming_events: EventRepo::count_upcoming(&state.pool).await?,
            events,
            users: to_responses(&users),
        },
    }))
}

/// GET /api/v1/dashboard/superadmin?role=
pub async fn superadmin(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DataResponse<SuperAdminDashboard>>> {
    auth.require(Capability::ViewSuperAdminDashboard)?;
    let role = choice_filter(query.role.as_deref());

    let departments = DepartmentRepo::list(&state.pool).await?;
    let users = UserRepo::list(&state.pool, role.as_deref(), None).await?;
    let events = EventRepo::list(&state.pool, &EventFilter::default()).await?;

    Ok(Json(DataResponse {
        data: SuperAdminDashboard {
            total_departments: DepartmentRepo::count(&state.pool).await?,
            total_users: UserRepo::count(&state.pool, role.as_deref()).await?,
            total_events: EventRepo::count(&state.pool).await?,
            total_bookings: TicketRepo::count(&state.pool).await?,
            departments,
            users: to_responses(&users),
            events,
        },
    }))
}

/// GET /api/v1/dashboard/events?category=&search=
pub async fn filter_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DataResponse<Vec<EventWithStats>>>> {
    auth.require(Capability::ViewAdminDashboard)?;
    let filter = EventFilter {
        category: choice_filter(query.category.as_deref()),
        search: non_blank(query.search),
        ..Default::default()
    };
    let events = EventRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/dashboard/users?role=&search=
pub async fn filter_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    auth.require(Capability::ViewAdminDashboard)?;
    let role = choice_filter(query.role.as_deref());
    let search = non_blank(query.search);
    let users = UserRepo::list(&state.pool, role.as_deref(), search.as_deref()).await?;
    Ok(Json(DataResponse {
        data: to_responses(&users),
    }))
}
