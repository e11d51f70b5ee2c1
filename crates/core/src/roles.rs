//! User roles and the capability table that guards every protected operation.
//!
//! Role names must match the `CHECK` constraint on `users.role` in
//! `20260301000002_create_users.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERADMIN: &str = "superadmin";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_ADMIN, ROLE_SUPERADMIN];

/// A user's role. Closed set; stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    /// Event admin (usually a member of staff tied to a department).
    Admin,
    SuperAdmin,
}

impl Role {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => ROLE_STUDENT,
            Self::Admin => ROLE_ADMIN,
            Self::SuperAdmin => ROLE_SUPERADMIN,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Admin => "Event Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }

    /// Whether this role may sign up through the public registration form.
    pub fn can_self_register(&self) -> bool {
        matches!(self, Self::Student | Self::Admin)
    }

    /// The capability table. Every protected operation is decided here.
    pub fn can(&self, capability: Capability) -> bool {
        use Capability::*;
        match capability {
            BookTicket | SuggestEvent => true,
            ViewStudentDashboard => *self == Self::Student,
            ViewAdminDashboard | ManageEvents => matches!(self, Self::Admin | Self::SuperAdmin),
            ViewSuperAdminDashboard | ManageDepartments | ManageUsers | ViewSystemLogs
            | ManageBackups => *self == Self::SuperAdmin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_STUDENT => Ok(Self::Student),
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_SUPERADMIN => Ok(Self::SuperAdmin),
            other => Err(CoreError::Validation(format!(
                "Unknown role: '{other}'. Valid roles: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}

/// A protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    BookTicket,
    SuggestEvent,
    ViewStudentDashboard,
    ViewAdminDashboard,
    ManageEvents,
    ViewSuperAdminDashboard,
    ManageDepartments,
    ManageUsers,
    ViewSystemLogs,
    ManageBackups,
}

impl Capability {
    fn describe(&self) -> &'static str {
        match self {
            Self::BookTicket => "book tickets",
            Self::SuggestEvent => "suggest events",
            Self::ViewStudentDashboard => "view the student dashboard",
            Self::ViewAdminDashboard => "view the admin dashboard",
            Self::ManageEvents => "manage events",
            Self::ViewSuperAdminDashboard => "view the super admin dashboard",
            Self::ManageDepartments => "manage departments",
            Self::ManageUsers => "manage users",
            Self::ViewSystemLogs => "view system logs",
            Self::ManageBackups => "manage backups",
        }
    }
}

/// Check `role` against `capability`, returning [`CoreError::Forbidden`] on refusal.
pub fn authorize(role: Role, capability: Capability) -> Result<(), CoreError> {
    if role.can(capability) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "You don't have permission to {}",
            capability.describe()
        )))
    }
}
