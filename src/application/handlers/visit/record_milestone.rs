//! RecordMilestoneHandler - Command handler for stop milestones.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{SegmentAction, Visit, VisitError};
use crate::ports::{CapabilityChecker, VisitOperation, VisitStore};

use super::{ensure_allowed, load_visit};

/// Command to record a milestone on the current stop.
#[derive(Debug, Clone)]
pub struct RecordMilestoneCommand {
    pub visit_id: VisitId,
    pub action: SegmentAction,
}

/// Handler for milestone actions such as "Counselling" or "DS-160 Started".
pub struct RecordMilestoneHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
}

impl RecordMilestoneHandler {
    pub fn new(store: Arc<dyn VisitStore>, checker: Arc<dyn CapabilityChecker>) -> Self {
        Self { store, checker }
    }

    pub async fn handle(
        &self,
        cmd: RecordMilestoneCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let mut visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(
            self.checker.as_ref(),
            &metadata.actor,
            Some(&visit),
            VisitOperation::RecordMilestone,
        )?;

        visit.record_milestone(cmd.action.clone())?;
        let stored = self.store.update_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            action = %cmd.action,
            correlation_id = %metadata.correlation_id(),
            "milestone recorded"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;

    #[tokio::test]
    async fn records_action_on_last_segment() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Visa",
            1,
            start(),
        )]));
        let handler = RecordMilestoneHandler::new(store, checker());

        let visit = handler
            .handle(
                RecordMilestoneCommand {
                    visit_id: VisitId::new("w").unwrap(),
                    action: SegmentAction::Ds160Started,
                },
                staff("Kiran"),
            )
            .await
            .unwrap();

        assert_eq!(visit.last_segment().action, Some(SegmentAction::Ds160Started));
    }

    #[tokio::test]
    async fn checked_out_visit_rejects_milestones() {
        let mut done = walk_in("w", "Visa", 1, start().plus_secs(-100));
        done.check_out(start()).unwrap();
        let handler = RecordMilestoneHandler::new(Arc::new(InMemoryVisitStore::with_visits(vec![done])), checker());

        let err = handler
            .handle(
                RecordMilestoneCommand {
                    visit_id: VisitId::new("w").unwrap(),
                    action: SegmentAction::Counselling,
                },
                staff("Kiran"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::InvalidTransition(_)));
    }
}
