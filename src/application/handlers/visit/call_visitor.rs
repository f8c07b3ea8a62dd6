//! CallVisitorHandler - Command handler for calling a visitor to a stop.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{Visit, VisitError};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::{ensure_allowed, load_visit};

/// Command to call a visitor.
#[derive(Debug, Clone)]
pub struct CallVisitorCommand {
    pub visit_id: VisitId,
}

/// Handler for calling visitors. Calling again refreshes the call.
pub struct CallVisitorHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    clock: Arc<dyn Clock>,
}

impl CallVisitorHandler {
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
        cmd: CallVisitorCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let mut visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(self.checker.as_ref(), &metadata.actor, Some(&visit), VisitOperation::Call)?;

        visit.call(self.clock.now())?;
        let stored = self.store.update_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            target = stored.target(),
            called_by = %metadata.actor.name,
            correlation_id = %metadata.correlation_id(),
            "visitor called"
        );
        Ok(stored)
    }
}
