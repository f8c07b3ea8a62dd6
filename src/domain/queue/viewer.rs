//! Who is looking at a queue, and how much of it they asked to see.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{Actor, StaffId, ValidationError};

/// Identity used for queue ownership matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: StaffId,
    pub name: String,
    pub department: Option<String>,
    pub is_admin: bool,
}

impl Viewer {
    pub fn new(id: StaffId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            department: None,
            is_admin: false,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Mode actually applied: only administrators may see every visit.
    pub fn effective_mode(&self, requested: ViewMode) -> ViewMode {
        match requested {
            ViewMode::All if self.is_admin => ViewMode::All,
            _ => ViewMode::Mine,
        }
    }
}

impl From<&Actor> for Viewer {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            name: actor.name.clone(),
            department: actor.department.clone(),
            is_admin: actor.is_admin(),
        }
    }
}

/// Which visits a queue shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Only visits whose current stop matches the viewer.
    #[default]
    Mine,
    /// Every open visit (administrators only).
    All,
}

impl FromStr for ViewMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mine" | "" => Ok(ViewMode::Mine),
            "all" => Ok(ViewMode::All),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("expected 'mine' or 'all', got '{}'", other),
            )),
        }
    }
}
