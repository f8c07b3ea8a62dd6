//! ForwardVisitHandler - Command handler for routing a visitor onward.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{HostTarget, Visit, VisitError};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::{ensure_allowed, load_visit};

/// Command to forward a visit to another department or staff member.
#[derive(Debug, Clone)]
pub struct ForwardVisitCommand {
    pub visit_id: VisitId,
    pub target: HostTarget,
    /// Defaults to "Follow up from <actor name>" when absent or blank.
    pub purpose: Option<String>,
}

/// Handler for forwarding visits.
pub struct ForwardVisitHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    clock: Arc<dyn Clock>,
}

impl ForwardVisitHandler {
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
        cmd: ForwardVisitCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let mut visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(self.checker.as_ref(), &metadata.actor, Some(&visit), VisitOperation::Forward)?;

        let from = visit.target().to_string();
        visit.forward(cmd.target, cmd.purpose, &metadata.actor.name, self.clock.now())?;
        let stored = self.store.update_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            from = %from,
            to = stored.target(),
            stops = stored.segments().len(),
            correlation_id = %metadata.correlation_id(),
            "visit forwarded"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;
    use crate::domain::visit::VisitStatus;

    fn handler(store: Arc<InMemoryVisitStore>) -> ForwardVisitHandler {
        ForwardVisitHandler::new(store, checker(), clock())
    }

    fn cmd(id: &str, to: &str) -> ForwardVisitCommand {
        ForwardVisitCommand {
            visit_id: VisitId::new(id).unwrap(),
            target: HostTarget::new(to),
            purpose: None,
        }
    }

    #[tokio::test]
    async fn forward_appends_segment_named_after_actor() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start().plus_secs(-60),
        )]));

        let visit = handler(store.clone())
            .handle(cmd("w", "Finance"), staff("Priya"))
            .await
            .unwrap();

        assert_eq!(visit.segments().len(), 2);
        assert_eq!(visit.status(), VisitStatus::CheckedIn);
        assert_eq!(visit.primary_host(), "Finance");
        assert_eq!(visit.last_segment().purpose, "Follow up from Priya");
        assert_eq!(store.writes_for(visit.id()).await.len(), 1);
    }

    #[tokio::test]
    async fn checked_out_visit_cannot_be_forwarded() {
        let mut done = walk_in("w", "Admissions", 1, start().plus_secs(-600));
        done.check_out(start().plus_secs(-60)).unwrap();
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![done]));

        let err = handler(store.clone())
            .handle(cmd("w", "Finance"), staff("Priya"))
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::InvalidTransition(_)));
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn blank_target_is_validation_error() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start(),
        )]));
        let err = handler(store).handle(cmd("w", " "), staff("Priya")).await.unwrap_err();
        assert!(matches!(err, VisitError::ValidationFailed { ref field, .. } if field == "department"));
    }
}
