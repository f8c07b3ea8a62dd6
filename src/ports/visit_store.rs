//! Visit store port.
//!
//! The sole I/O boundary of the engine. Every call is a whole-record
//! operation: there is no field-level merge on the far side, so callers
//! that change a visit must read it, apply their change, and write the
//! full record back.
//!
//! # Design
//!
//! - **Last write wins**: no version tokens; concurrent writers race
//! - **Store-assigned ids**: `create_visit` returns the visit as stored,
//!   which may carry a different id than the one sent

use crate::domain::foundation::{ContactId, DomainError, VisitId};
use crate::domain::visit::Visit;
use async_trait::async_trait;

/// Port for reading and writing visit records.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Full snapshot of all visits.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` / `DatabaseError` on transport failure
    async fn list_visits(&self) -> Result<Vec<Visit>, DomainError>;

    /// Visits linked to one contact, for per-contact history.
    async fn list_visits_for_contact(&self, contact_id: &ContactId) -> Result<Vec<Visit>, DomainError>;

    /// Fresh read of one visit.
    ///
    /// Returns `None` if the visit does not exist.
    async fn get_visit(&self, id: &VisitId) -> Result<Option<Visit>, DomainError>;

    /// Persist a new visit and return it as stored.
    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DomainError>;

    /// Replace a visit record wholesale and return it as stored.
    ///
    /// # Errors
    ///
    /// - `VisitNotFound` if the visit doesn't exist
    async fn update_visit(&self, visit: &Visit) -> Result<Visit, DomainError>;

    /// Administrative removal.
    ///
    /// # Errors
    ///
    /// - `VisitNotFound` if the visit doesn't exist
    async fn delete_visit(&self, id: &VisitId) -> Result<(), DomainError>;
}
