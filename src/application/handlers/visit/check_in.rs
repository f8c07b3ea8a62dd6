//! CheckInVisitHandler - Command handler for scheduled visitors arriving.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::visit::{DailySequencer, Visit, VisitError};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::{ensure_allowed, CheckInLock};

/// Command to check in a scheduled visit.
#[derive(Debug, Clone)]
pub struct CheckInVisitCommand {
    pub visit_id: VisitId,
}

/// Handler for checking in scheduled visits.
pub struct CheckInVisitHandler {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    clock: Arc<dyn Clock>,
    sequencer: DailySequencer,
    lock: CheckInLock,
}

impl CheckInVisitHandler {
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

    pub async fn handle(
        &self,
        cmd: CheckInVisitCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let _guard = self.lock.acquire().await;

        // 1. Snapshot doubles as the fresh read of the visit
        let snapshot = self.store.list_visits().await?;
        let mut visit = snapshot
            .iter()
            .find(|v| v.id() == &cmd.visit_id)
            .cloned()
            .ok_or_else(|| VisitError::not_found(cmd.visit_id.clone()))?;

        // 2. Authorize
        ensure_allowed(self.checker.as_ref(), &metadata.actor, Some(&visit), VisitOperation::CheckIn)?;

        // 3. Apply
        let now = self.clock.now();
        let number = self.sequencer.next_number(&snapshot, Some(&cmd.visit_id), &now);
        visit.check_in(number, now)?;

        // 4. Persist
        let stored = self.store.update_visit(&visit).await?;

        tracing::info!(
            visit_id = %stored.id(),
            daily_sequence_number = stored.daily_sequence_number(),
            correlation_id = %metadata.correlation_id(),
            "scheduled visit checked in"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;
    use crate::domain::foundation::{ContactId, DomainError, ErrorCode};
    use crate::domain::visit::VisitStatus;
    use async_trait::async_trait;

    fn handler(store: Arc<InMemoryVisitStore>) -> CheckInVisitHandler {
        CheckInVisitHandler::new(
            store,
            checker(),
            clock(),
            DailySequencer::default(),
            CheckInLock::new(),
        )
    }

    fn cmd(id: &str) -> CheckInVisitCommand {
        CheckInVisitCommand {
            visit_id: VisitId::new(id).unwrap(),
        }
    }

    #[tokio::test]
    async fn checks_in_and_numbers_after_earlier_arrivals() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![
            walk_in("w", "Finance", 1, start().plus_secs(-60)),
            scheduled("s", "Admissions", start().plus_secs(-86_400)),
        ]));

        let visit = handler(store).handle(cmd("s"), desk()).await.unwrap();

        assert_eq!(visit.status(), VisitStatus::CheckedIn);
        assert_eq!(visit.daily_sequence_number(), Some(2));
        assert_eq!(visit.check_in_time(), Some(&start()));
        assert_eq!(visit.segments()[0].timestamp, start());
    }

    #[tokio::test]
    async fn already_checked_in_is_invalid_transition() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Finance",
            1,
            start(),
        )]));

        let err = handler(store.clone()).handle(cmd("w"), desk()).await.unwrap_err();
        assert!(matches!(err, VisitError::InvalidTransition(_)));
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_visit_is_not_found() {
        let store = Arc::new(InMemoryVisitStore::new());
        let err = handler(store).handle(cmd("missing"), desk()).await.unwrap_err();
        assert_eq!(err, VisitError::NotFound(VisitId::new("missing").unwrap()));
    }

    struct FailOnUpdate(Arc<InMemoryVisitStore>);

    #[async_trait]
    impl VisitStore for FailOnUpdate {
        async fn list_visits(&self) -> Result<Vec<Visit>, DomainError> {
            self.0.list_visits().await
        }
        async fn list_visits_for_contact(&self, contact_id: &ContactId) -> Result<Vec<Visit>, DomainError> {
            self.0.list_visits_for_contact(contact_id).await
        }
        async fn get_visit(&self, id: &VisitId) -> Result<Option<Visit>, DomainError> {
            self.0.get_visit(id).await
        }
        async fn create_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
            self.0.create_visit(visit).await
        }
        async fn update_visit(&self, _visit: &Visit) -> Result<Visit, DomainError> {
            Err(DomainError::new(ErrorCode::StoreUnavailable, "Simulated update failure"))
        }
        async fn delete_visit(&self, id: &VisitId) -> Result<(), DomainError> {
            self.0.delete_visit(id).await
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_visit_scheduled() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![scheduled(
            "s",
            "Admissions",
            start(),
        )]));
        let failing = CheckInVisitHandler::new(
            Arc::new(FailOnUpdate(store.clone())),
            checker(),
            clock(),
            DailySequencer::default(),
            CheckInLock::new(),
        );

        let err = failing.handle(cmd("s"), desk()).await.unwrap_err();
        assert!(err.is_retryable());

        let stored = store.get_visit(&VisitId::new("s").unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.status(), VisitStatus::Scheduled);
        assert_eq!(stored.daily_sequence_number(), None);
    }
}
