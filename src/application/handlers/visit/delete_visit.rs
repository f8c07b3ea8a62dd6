//! DeleteVisitHandler - Administrative removal of a visit record.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::VisitError;
use crate::ports::{CapabilityChecker, VisitOperation, VisitStore};

use super::{ensure_allowed, load_visit};

/// Command to delete a visit.
#[derive(Debug, Clone)]
pub struct DeleteVisitCommand {
    pub visit_id: VisitId,
}

/// Handler for administrative removal. Sits outside the lifecycle: any
/// status may be removed.
pub struct DeleteVisitHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
}

impl DeleteVisitHandler {
    pub fn new(store: Arc<dyn VisitStore>, checker: Arc<dyn CapabilityChecker>) -> Self {
        Self { store, checker }
    }

    pub async fn handle(&self, cmd: DeleteVisitCommand, metadata: CommandMetadata) -> Result<(), VisitError> {
        let visit = load_visit(self.store.as_ref(), &cmd.visit_id).await?;
        ensure_allowed(self.checker.as_ref(), &metadata.actor, Some(&visit), VisitOperation::Delete)?;

        self.store.delete_visit(&cmd.visit_id).await?;

        tracing::warn!(
            visit_id = %cmd.visit_id,
            deleted_by = %metadata.actor.id,
            correlation_id = %metadata.correlation_id(),
            "visit deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;

    #[tokio::test]
    async fn desk_with_delete_permission_removes_visit() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start(),
        )]));
        let handler = DeleteVisitHandler::new(store.clone(), checker());
        let visit_id = VisitId::new("w").unwrap();

        handler
            .handle(DeleteVisitCommand { visit_id: visit_id.clone() }, desk())
            .await
            .unwrap();
        assert!(store.get_visit(&visit_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn staff_without_permission_cannot_delete() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start(),
        )]));
        let handler = DeleteVisitHandler::new(store.clone(), checker());

        let err = handler
            .handle(
                DeleteVisitCommand {
                    visit_id: VisitId::new("w").unwrap(),
                },
                staff("Priya"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::Forbidden { .. }));
        assert_eq!(store.list_visits().await.unwrap().len(), 1);
    }
}
