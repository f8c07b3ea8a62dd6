//! In-memory visit store.
//!
//! Backs the `memory` store backend and the test suites. Records are kept in
//! insertion order, like a table scan without `ORDER BY`.
//!
//! Beyond the port it offers test hooks: failure injection, a write log and
//! call counters.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ContactId, DomainError, ErrorCode, VisitId};
use crate::domain::visit::Visit;
use crate::ports::VisitStore;

/// In-memory implementation of [`VisitStore`].
#[derive(Clone, Default)]
pub struct InMemoryVisitStore {
    visits: Arc<RwLock<Vec<Visit>>>,
    writes: Arc<RwLock<Vec<Visit>>>,
    /// Number of upcoming calls that fail with `StoreUnavailable`.
    failures: Arc<AtomicUsize>,
    /// When set, created visits get sequential numeric ids like a SERIAL column.
    next_serial: Option<Arc<AtomicU64>>,
    update_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that replaces client ids with `1, 2, 3...` on create.
    pub fn with_numeric_ids() -> Self {
        Self {
            next_serial: Some(Arc::new(AtomicU64::new(1))),
            ..Self::default()
        }
    }

    /// Store pre-populated with visits.
    pub fn with_visits(visits: Vec<Visit>) -> Self {
        Self {
            visits: Arc::new(RwLock::new(visits)),
            ..Self::default()
        }
    }

    // === Test Helpers ===

    /// Makes the next `count` calls fail with `StoreUnavailable`.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Number of `update_visit` calls that reached the store, failed or not.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Number of `create_visit` calls that reached the store, failed or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Every successfully written record, oldest first.
    pub async fn write_log(&self) -> Vec<Visit> {
        self.writes.read().await.clone()
    }

    /// Successful writes of one visit, oldest first.
    pub async fn writes_for(&self, id: &VisitId) -> Vec<Visit> {
        self.writes
            .read()
            .await
            .iter()
            .filter(|v| v.id() == id)
            .cloned()
            .collect()
    }

    /// Replaces a record directly, bypassing counters and failure injection.
    ///
    /// Simulates a write from another session.
    pub async fn put(&self, visit: Visit) {
        let mut visits = self.visits.write().await;
        match visits.iter_mut().find(|v| v.id() == visit.id()) {
            Some(existing) => *existing = visit,
            None => visits.push(visit),
        }
    }

    fn take_failure(&self) -> Result<(), DomainError> {
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            Err(DomainError::new(
                ErrorCode::StoreUnavailable,
                "Injected store failure",
            ))
        } else {
            Ok(())
        }
    }

    fn not_found(id: &VisitId) -> DomainError {
        DomainError::new(ErrorCode::VisitNotFound, format!("Visit not found: {}", id))
            .with_detail("visit_id", id.as_str())
    }
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn list_visits(&self) -> Result<Vec<Visit>, DomainError> {
        self.take_failure()?;
        Ok(self.visits.read().await.clone())
    }

    async fn list_visits_for_contact(&self, contact_id: &ContactId) -> Result<Vec<Visit>, DomainError> {
        self.take_failure()?;
        Ok(self
            .visits
            .read()
            .await
            .iter()
            .filter(|v| v.contact_id() == Some(contact_id))
            .cloned()
            .collect())
    }

    async fn get_visit(&self, id: &VisitId) -> Result<Option<Visit>, DomainError> {
        self.take_failure()?;
        Ok(self.visits.read().await.iter().find(|v| v.id() == id).cloned())
    }

    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let stored = match &self.next_serial {
            Some(serial) => {
                let id = VisitId::new(serial.fetch_add(1, Ordering::SeqCst).to_string())?;
                visit.clone().with_id(id)
            }
            None => visit.clone(),
        };

        let mut visits = self.visits.write().await;
        if visits.iter().any(|v| v.id() == stored.id()) {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Visit already exists: {}", stored.id()),
            ));
        }
        visits.push(stored.clone());
        self.writes.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let mut visits = self.visits.write().await;
        let existing = visits
            .iter_mut()
            .find(|v| v.id() == visit.id())
            .ok_or_else(|| Self::not_found(visit.id()))?;
        *existing = visit.clone();
        self.writes.write().await.push(visit.clone());
        Ok(visit.clone())
    }

    async fn delete_visit(&self, id: &VisitId) -> Result<(), DomainError> {
        self.take_failure()?;
        let mut visits = self.visits.write().await;
        let before = visits.len();
        visits.retain(|v| v.id() != id);
        if visits.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
