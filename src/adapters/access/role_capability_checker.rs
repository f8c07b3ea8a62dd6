//! Capability checker implementing the portal's role rules.
//!
//! # Rules
//!
//! - Administrators may do everything.
//! - Reception `create` permission: schedule and walk-in.
//! - Reception `update` permission: check-in, check-out, detail and purpose edits.
//! - Reception `delete` permission: administrative removal.
//! - Staff (not students) may call, forward and record milestones. Staff may
//!   also edit the purpose of a stop they currently host.

use crate::domain::foundation::{Actor, StaffRole};
use crate::domain::visit::Visit;
use crate::ports::{CapabilityChecker, VisitOperation};

/// Role and reception-permission based [`CapabilityChecker`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleCapabilityChecker;

impl RoleCapabilityChecker {
    pub fn new() -> Self {
        Self
    }

    fn hosts_current_stop(actor: &Actor, visit: Option<&Visit>) -> bool {
        let Some(visit) = visit else {
            return false;
        };
        let target = visit.target().to_lowercase();
        let name = actor.name.trim().to_lowercase();
        (!name.is_empty() && target.contains(&name))
            || actor
                .department
                .as_deref()
                .map(|d| d.trim().to_lowercase() == target)
                .unwrap_or(false)
    }
}

impl CapabilityChecker for RoleCapabilityChecker {
    fn can_transition(&self, actor: &Actor, visit: Option<&Visit>, operation: VisitOperation) -> bool {
        if actor.is_admin() {
            return true;
        }
        let is_staff = actor.role == StaffRole::Staff;
        let reception = actor.reception;

        match operation {
            VisitOperation::Schedule | VisitOperation::WalkIn => reception.create,
            VisitOperation::CheckIn | VisitOperation::CheckOut | VisitOperation::EditDetails => {
                reception.update
            }
            VisitOperation::EditPurpose => {
                reception.update || (is_staff && Self::hosts_current_stop(actor, visit))
            }
            VisitOperation::Call | VisitOperation::Forward | VisitOperation::RecordMilestone => {
                is_staff
            }
            VisitOperation::Delete => reception.delete,
        }
    }
}
