//! The staff member on whose behalf an engine operation runs.
//!
//! Authentication happens upstream; by the time a command reaches a handler the
//! caller has already been resolved into an `Actor`. Role and permission
//! storage live outside this crate, so the actor carries a snapshot of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StaffId, ValidationError};

/// Role of a portal user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StaffRole {
    Admin,
    #[default]
    Staff,
    Student,
}

impl StaffRole {
    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        matches!(self, StaffRole::Admin)
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StaffRole::Admin => "Admin",
            StaffRole::Staff => "Staff",
            StaffRole::Student => "Student",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for StaffRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Ok(StaffRole::Admin),
            "staff" => Ok(StaffRole::Staff),
            "student" => Ok(StaffRole::Student),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Reception-app permissions granted to a non-administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceptionPermissions {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl ReceptionPermissions {
    /// All reception permissions.
    pub fn full() -> Self {
        Self {
            create: true,
            update: true,
            delete: true,
        }
    }

    /// Parses a comma separated list such as `"create,update"`.
    ///
    /// Unknown entries are ignored.
    pub fn parse_list(list: &str) -> Self {
        let mut perms = Self::default();
        for entry in list.split(',').map(|s| s.trim().to_ascii_lowercase()) {
            match entry.as_str() {
                "create" => perms.create = true,
                "update" => perms.update = true,
                "delete" => perms.delete = true,
                _ => {}
            }
        }
        perms
    }
}

/// Staff member (or administrator) issuing a command or viewing a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Portal user identifier.
    pub id: StaffId,

    /// Display name, also used for queue ownership matching.
    pub name: String,

    /// Email address, mirrored into `staff_email` when the actor hosts a visit.
    pub email: Option<String>,

    pub role: StaffRole,

    /// Department label the actor serves, if configured.
    pub department: Option<String>,

    pub reception: ReceptionPermissions,
}

impl Actor {
    /// Creates a staff actor with no reception permissions.
    pub fn new(id: StaffId, name: impl Into<String>, role: StaffRole) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            role,
            department: None,
            reception: ReceptionPermissions::default(),
        }
    }

    /// Builder: set the department label.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Builder: set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder: set reception permissions.
    pub fn with_reception(mut self, reception: ReceptionPermissions) -> Self {
        self.reception = reception;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
