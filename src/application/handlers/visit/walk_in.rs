//! WalkInHandler - Command handler for visitors arriving without an appointment.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{DailySequencer, HostTarget, Visit, VisitError, VisitorDetails};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::{ensure_allowed, CheckInLock};

/// Command to register a walk-in.
#[derive(Debug, Clone)]
pub struct WalkInCommand {
    pub details: VisitorDetails,
    pub target: HostTarget,
    pub purpose: Option<String>,
}

/// Handler for walk-in check-ins.
pub struct WalkInHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    clock: Arc<dyn Clock>,
    sequencer: DailySequencer,
    lock: CheckInLock,
}

impl WalkInHandler {
    pub fn new(
        store: Arc<dyn VisitStore>,
        checker: Arc<dyn CapabilityChecker>,
        clock: Arc<dyn Clock>,
        sequencer: DailySequencer,
        lock: CheckInLock,
    ) -> Self {
        Self {
            store,
            checker,
            clock,
            sequencer,
            lock,
        }
    }

    pub async fn handle(&self, cmd: WalkInCommand, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        // 1. Authorize and validate before any store call
        ensure_allowed(self.checker.as_ref(), &metadata.actor, None, VisitOperation::WalkIn)?;
        Visit::validate_new(&cmd.details, &cmd.target, cmd.purpose.as_deref())?;

        // 2. Number from a snapshot taken under the check-in lock
        let _guard = self.lock.acquire().await;
        let snapshot = self.store.list_visits().await?;
        let now = self.clock.now();
        let number = self.sequencer.next_number(&snapshot, None, &now);

        // 3. Create
        let visit = Visit::walk_in(
            VisitId::generate(),
            cmd.details,
            cmd.target,
            cmd.purpose,
            number,
            now,
        )?;
        let stored = self.store.create_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            daily_sequence_number = number,
            department = stored.target(),
            correlation_id = %metadata.correlation_id(),
            "walk-in checked in"
        );
        Ok(stored)
    }
}
