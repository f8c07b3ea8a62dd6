//! Visit command and query handlers.
//!
//! Every command follows the same shape: fresh read from the store, capability
//! check, domain operation, whole-record write. Nothing is reflected locally
//! until the write succeeds.

mod call_visitor;
mod check_in;
mod check_out;
mod delete_visit;
mod forward_visit;
mod get_visit;
mod list_contact_visits;
mod record_milestone;
mod schedule_visit;
mod update_details;
mod walk_in;

pub use call_visitor::{CallVisitorCommand, CallVisitorHandler};
pub use check_in::{CheckInVisitCommand, CheckInVisitHandler};
pub use check_out::{CheckOutVisitCommand, CheckOutVisitHandler};
pub use delete_visit::{DeleteVisitCommand, DeleteVisitHandler};
pub use forward_visit::{ForwardVisitCommand, ForwardVisitHandler};
pub use get_visit::{GetVisitHandler, GetVisitQuery, VisitView};
pub use list_contact_visits::{ListContactVisitsHandler, ListContactVisitsQuery};
pub use record_milestone::{RecordMilestoneCommand, RecordMilestoneHandler};
pub use schedule_visit::{ScheduleVisitCommand, ScheduleVisitHandler};
pub use update_details::{UpdateVisitDetailsCommand, UpdateVisitDetailsHandler};
pub use walk_in::{WalkInCommand, WalkInHandler};

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{Actor, VisitId};
use crate::domain::visit::{Visit, VisitError};
use crate::ports::{CapabilityChecker, VisitOperation, VisitStore};

/// Serialises check-ins within one process so that two local check-ins never
/// number themselves from the same snapshot.
///
/// Shared by the walk-in and check-in handlers.
#[derive(Debug, Clone, Default)]
pub struct CheckInLock(Arc<Mutex<()>>);

impl CheckInLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn acquire(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

/// Fresh read of a visit, mapping absence to `NotFound`.
pub(crate) async fn load_visit(store: &dyn VisitStore, id: &VisitId) -> Result<Visit, VisitError> {
    store
        .get_visit(id)
        .await?
        .ok_or_else(|| VisitError::not_found(id.clone()))
}

/// Capability check that turns a refusal into `Forbidden`.
pub(crate) fn ensure_allowed(
    checker: &dyn CapabilityChecker,
    actor: &Actor,
    visit: Option<&Visit>,
    operation: VisitOperation,
) -> Result<(), VisitError> {
    if checker.can_transition(actor, visit, operation) {
        Ok(())
    } else {
        tracing::warn!(
            actor = %actor.id,
            operation = ?operation,
            visit_id = visit.map(|v| v.id().as_str()),
            "capability check denied"
        );
        Err(VisitError::forbidden(operation.describe()))
    }
}
