//! ScheduleVisitHandler - Command handler for booking future visits.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, Timestamp, VisitId};
use crate::domain::visit::{HostTarget, Visit, VisitError, VisitorDetails};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::ensure_allowed;

/// Command to schedule a visit.
#[derive(Debug, Clone)]
pub struct ScheduleVisitCommand {
    pub details: VisitorDetails,
    pub target: HostTarget,
    pub scheduled_check_in_time: Timestamp,
    pub purpose: Option<String>,
}

/// Handler for scheduling visits.
pub struct ScheduleVisitHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    clock: Arc<dyn Clock>,
}

impl ScheduleVisitHandler {
    pub fn new(
        store: Arc<dyn VisitStore>,
        checker: Arc<dyn CapabilityChecker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            checker,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ScheduleVisitCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        ensure_allowed(self.checker.as_ref(), &metadata.actor, None, VisitOperation::Schedule)?;

        let visit = Visit::schedule(
            VisitId::generate(),
            cmd.details,
            cmd.target,
            cmd.scheduled_check_in_time,
            cmd.purpose,
            self.clock.now(),
        )?;

        let stored = self.store.create_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            department = stored.target(),
            correlation_id = %metadata.correlation_id(),
            "visit scheduled"
        );
        Ok(stored)
    }
}
