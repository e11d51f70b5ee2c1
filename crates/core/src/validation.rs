//! Input validation for registrations, departments, and events.
//!
//! Every validator returns [`CoreError::Validation`] with a message suitable
//! for showing to the user.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_ENROLLMENT_NO_LEN: usize = 20;
pub const MAX_DEPARTMENT_NAME_LEN: usize = 100;
pub const MAX_DEPARTMENT_CODE_LEN: usize = 10;
pub const MAX_EVENT_TITLE_LEN: usize = 200;
pub const MAX_EVENT_LOCATION_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Event categories
// ---------------------------------------------------------------------------

/// Event category. Stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Seminar,
    Concert,
    StageEvent,
    Educational,
    #[default]
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        Self::Seminar,
        Self::Concert,
        Self::StageEvent,
        Self::Educational,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seminar => "seminar",
            Self::Concert => "concert",
            Self::StageEvent => "stage_event",
            Self::Educational => "educational",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Seminar => "Seminar",
            Self::Concert => "Concert",
            Self::StageEvent => "Stage Event",
            Self::Educational => "Educational",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                CoreError::Validation(format!(
                    "Unknown category: '{s}'. Valid categories: {}",
                    valid.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Generic helpers
// ---------------------------------------------------------------------------

/// Require a non-blank value no longer than `max_len` characters.
pub fn validate_required(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required.")));
    }
    if trimmed.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters."
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Usernames are letters, digits, and `@ . + - _` only.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    validate_required("Username", username, MAX_USERNAME_LEN)?;
    let valid = username
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err(CoreError::Validation(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        ));
    }
    Ok(())
}

/// Role-dependent registration rules.
///
/// Applies to public sign-ups and admin-created accounts alike; both only
/// accept students and event admins.
pub fn validate_registration(
    role: Role,
    enrollment_no: Option<&str>,
    department_id: Option<DbId>,
) -> Result<(), CoreError> {
    if !role.can_self_register() {
        return Err(CoreError::Validation(
            "Only Students and Event Admins can register directly.".into(),
        ));
    }

    let enrollment_no = enrollment_no.map(str::trim).filter(|s| !s.is_empty());
    match role {
        Role::Student if enrollment_no.is_none() => Err(CoreError::Validation(
            "Enrollment number is required for students.".into(),
        )),
        Role::Admin if department_id.is_none() => Err(CoreError::Validation(
            "Department is required for event admins.".into(),
        )),
        _ => {
            if let Some(no) = enrollment_no {
                validate_required("Enrollment number", no, MAX_ENROLLMENT_NO_LEN)?;
            }
            Ok(())
        }
    }
}

/// Both password fields must match.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), CoreError> {
    if password != confirmation {
        return Err(CoreError::Validation("The two password fields didn't match.".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

pub fn validate_department(name: &str, code: &str) -> Result<(), CoreError> {
    validate_required("Name", name, MAX_DEPARTMENT_NAME_LEN)?;
    validate_required("Code", code, MAX_DEPARTMENT_CODE_LEN)
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The event must start after `now`.
pub fn validate_event_schedule(starts_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if starts_at < now {
        return Err(CoreError::Validation(
            "Event date and time must be in the future.".into(),
        ));
    }
    Ok(())
}

pub fn validate_capacity(available_tickets: i32) -> Result<(), CoreError> {
    if available_tickets <= 0 {
        return Err(CoreError::Validation(
            "Number of available tickets must be greater than zero.".into(),
        ));
    }
    Ok(())
}

pub fn validate_price(ticket_price: f64) -> Result<(), CoreError> {
    if !ticket_price.is_finite() || ticket_price < 0.0 {
        return Err(CoreError::Validation(
            "Ticket price must be zero or greater.".into(),
        ));
    }
    Ok(())
}

/// Capacity may not drop below the number of tickets already issued.
pub fn validate_capacity_change(new_capacity: i32, issued: i64) -> Result<(), CoreError> {
    if i64::from(new_capacity) < issued {
        return Err(CoreError::Conflict(format!(
            "Cannot lower available tickets to {new_capacity}: {issued} tickets already issued"
        )));
    }
    Ok(())
}

/// Full check of a new event's fields.
#[allow(clippy::too_many_arguments)]
pub fn validate_new_event(
    title: &str,
    description: &str,
    location: &str,
    starts_at: Timestamp,
    available_tickets: i32,
    ticket_price: f64,
    now: Timestamp,
) -> Result<(), CoreError> {
    validate_required("Title", title, MAX_EVENT_TITLE_LEN)?;
    validate_required("Description", description, usize::MAX)?;
    validate_required("Location", location, MAX_EVENT_LOCATION_LEN)?;
    validate_event_schedule(starts_at, now)?;
    validate_capacity(available_tickets)?;
    validate_price(ticket_price)
}
