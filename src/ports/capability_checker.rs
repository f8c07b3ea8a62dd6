//! Capability check port.
//!
//! Every engine operation asks this port whether the acting staff member may
//! perform it, instead of consulting ambient role state. Role and permission
//! storage live outside the engine; the checker only sees the [`Actor`]
//! snapshot it is handed.
//!
//! # Design
//!
//! Checks are synchronous and total: an implementation that cannot decide
//! must answer `false`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Actor;
use crate::domain::visit::Visit;

/// Operations subject to a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOperation {
    Schedule,
    WalkIn,
    CheckIn,
    CheckOut,
    Call,
    Forward,
    RecordMilestone,
    EditPurpose,
    EditDetails,
    Delete,
}

impl VisitOperation {
    /// Verb phrase used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            VisitOperation::Schedule => "schedule visits",
            VisitOperation::WalkIn => "check in walk-in visitors",
            VisitOperation::CheckIn => "check in visitors",
            VisitOperation::CheckOut => "check out visitors",
            VisitOperation::Call => "call visitors",
            VisitOperation::Forward => "forward visitors",
            VisitOperation::RecordMilestone => "record milestones",
            VisitOperation::EditPurpose => "edit visit purpose",
            VisitOperation::EditDetails => "edit visitor details",
            VisitOperation::Delete => "delete visits",
        }
    }
}

impl fmt::Display for VisitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Port deciding whether an actor may perform an operation on a visit.
///
/// `visit` is `None` for operations that create one.
pub trait CapabilityChecker: Send + Sync {
    fn can_transition(&self, actor: &Actor, visit: Option<&Visit>, operation: VisitOperation) -> bool;
}
