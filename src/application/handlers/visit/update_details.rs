//! UpdateVisitDetailsHandler - Command handler for correcting visitor details.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{Visit, VisitDetailsPatch, VisitError};
use crate::ports::{CapabilityChecker, VisitOperation, VisitStore};

use super::{ensure_allowed, load_visit};

/// Command to patch visitor details (name, phone, card, contact, appointment).
#[derive(Debug, Clone)]
pub struct UpdateVisitDetailsCommand {
    pub visit_id: VisitId,
    pub patch: VisitDetailsPatch,
}

/// Handler for visitor detail edits.
pub struct UpdateVisitDetailsHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
}

impl UpdateVisitDetailsHandler {
    pub fn new(store: Arc<dyn VisitStore>, checker: Arc<dyn CapabilityChecker>) -> Self {
        Self { store, checker }
    }

    pub async fn handle(
        &self,
        cmd: UpdateVisitDetailsCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let mut visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(
            self.checker.as_ref(),
            &metadata.actor,
            Some(&visit),
            VisitOperation::EditDetails,
        )?;

        if cmd.patch.is_empty() {
            return Ok(visit);
        }
        visit.update_details(cmd.patch)?;
        let stored = self.store.update_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            correlation_id = %metadata.correlation_id(),
            "visitor details updated"
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
    async fn patches_card_number() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start(),
        )]));
        let handler = UpdateVisitDetailsHandler::new(store, checker());

        let visit = handler
            .handle(
                UpdateVisitDetailsCommand {
                    visit_id: VisitId::new("w").unwrap(),
                    patch: VisitDetailsPatch {
                        card_number: Some("BADGE-4".into()),
                        ..Default::default()
                    },
                },
                desk(),
            )
            .await
            .unwrap();
        assert_eq!(visit.card_number(), Some("BADGE-4"));
    }

    #[tokio::test]
    async fn empty_patch_does_not_write() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start(),
        )]));
        let handler = UpdateVisitDetailsHandler::new(store.clone(), checker());

        handler
            .handle(
                UpdateVisitDetailsCommand {
                    visit_id: VisitId::new("w").unwrap(),
                    patch: VisitDetailsPatch::default(),
                },
                desk(),
            )
            .await
            .unwrap();
        assert_eq!(store.update_calls(), 0);
    }
}
