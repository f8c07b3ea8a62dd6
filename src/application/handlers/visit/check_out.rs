//! CheckOutVisitHandler - Command handler for visitors leaving.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{Visit, VisitError};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::{ensure_allowed, load_visit};

/// Command to check out a visit.
#[derive(Debug, Clone)]
pub struct CheckOutVisitCommand {
    pub visit_id: VisitId,
}

/// Handler for checking out visits.
pub struct CheckOutVisitHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    clock: Arc<dyn Clock>,
}

impl CheckOutVisitHandler {
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

    /// Runs the permission and status checks without writing anything.
    ///
    /// Callers that must do store work before the check-out itself (flushing
    /// pending edits) call this first so a refused check-out touches nothing.
    pub async fn authorize(
        &self,
        cmd: &CheckOutVisitCommand,
        metadata: &CommandMetadata,
    ) -> Result<(), VisitError> {
        let visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(self.checker.as_ref(), &metadata.actor, Some(&visit), VisitOperation::CheckOut)?;

        let mut trial = visit;
        trial.check_out(self.clock.now())?;
        Ok(())
    }

    pub async fn handle(
        &self,
        cmd: CheckOutVisitCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let mut visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(self.checker.as_ref(), &metadata.actor, Some(&visit), VisitOperation::CheckOut)?;

        visit.check_out(self.clock.now())?;
        let stored = self.store.update_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            stops = stored.segments().len(),
            correlation_id = %metadata.correlation_id(),
            "visit checked out"
        );
        Ok(stored)
    }
}
