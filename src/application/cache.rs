//! Local visit cache with optimistic purpose overlays.
//!
//! The cache holds the last authoritative snapshot received from the store.
//! Pending purpose edits live beside it, keyed by `(visit, segment index)`,
//! and are applied on every read. A refresh replaces the snapshot but never
//! the overlays; an overlay is cleared only by the write that carried it.
//!
//! Every local write bumps a write epoch. A refresh records the epoch before
//! it reads the store, and visits written after that point keep their cached
//! form when the snapshot lands.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::VisitId;
use crate::domain::visit::{Visit, VisitError};

#[derive(Debug, Clone)]
struct PendingPurpose {
    purpose: String,
    generation: u64,
}

/// One pending purpose edit, as handed to the persister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub segment_index: usize,
    pub purpose: String,
    /// Identifies this exact edit; a newer edit of the same segment gets a
    /// higher generation.
    pub generation: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    visits: Vec<Visit>,
    overlays: HashMap<(VisitId, usize), PendingPurpose>,
    next_generation: u64,
    epoch: u64,
    /// Epoch of the latest local write or removal per visit.
    written: HashMap<VisitId, u64>,
    /// Start epoch of the newest refresh applied so far.
    applied_refresh: Option<u64>,
}

impl CacheState {
    fn overlay(&self, visit: &Visit) -> Visit {
        let mut view = visit.clone();
        for ((id, index), pending) in &self.overlays {
            if id == visit.id() {
                // A segment that vanished remotely keeps its overlay until the
                // write reports the failure.
                let _ = view.set_segment_purpose(*index, pending.purpose.clone());
            }
        }
        view
    }

    fn record_write(&mut self, id: &VisitId) {
        self.epoch += 1;
        let epoch = self.epoch;
        self.written.insert(id.clone(), epoch);
    }

    fn written_since(&self, id: &VisitId, started: u64) -> bool {
        self.written.get(id).is_some_and(|epoch| *epoch > started)
    }
}

/// Shared, clonable visit cache.
#[derive(Debug, Clone, Default)]
pub struct VisitCache {
    state: Arc<RwLock<CacheState>>,
}

impl VisitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot outright, as a refresh with nothing in flight.
    pub async fn replace_all(&self, visits: Vec<Visit>) {
        let started = self.begin_refresh().await;
        self.apply_refresh(started, visits).await;
    }

    /// Marks the start of a store read. Pass the returned epoch to
    /// [`apply_refresh`](Self::apply_refresh) once the read completes.
    pub async fn begin_refresh(&self) -> u64 {
        self.state.read().await.epoch
    }

    /// Installs a snapshot read from the store after `started`.
    ///
    /// Visits written or removed locally after `started` keep their cached
    /// state. A snapshot older than one already applied is dropped. Returns
    /// whether the snapshot was applied.
    pub async fn apply_refresh(&self, started: u64, fetched: Vec<Visit>) -> bool {
        let mut state = self.state.write().await;
        if state.applied_refresh.is_some_and(|applied| applied > started) {
            return false;
        }

        let mut visits = Vec::with_capacity(fetched.len());
        for visit in fetched {
            if !state.written_since(visit.id(), started) {
                visits.push(visit);
            }
        }
        for cached in &state.visits {
            if state.written_since(cached.id(), started) {
                visits.push(cached.clone());
            }
        }

        state.visits = visits;
        state.written.retain(|_, epoch| *epoch > started);
        state.applied_refresh = Some(started);
        true
    }

    /// Records the stored form of one visit after a successful write.
    pub async fn upsert(&self, visit: Visit) {
        let mut state = self.state.write().await;
        state.record_write(visit.id());
        match state.visits.iter_mut().find(|v| v.id() == visit.id()) {
            Some(existing) => *existing = visit,
            None => state.visits.push(visit),
        }
    }

    /// Drops a visit and any pending edits for it.
    pub async fn remove(&self, id: &VisitId) {
        let mut state = self.state.write().await;
        state.record_write(id);
        state.visits.retain(|v| v.id() != id);
        state.overlays.retain(|(visit_id, _), _| visit_id != id);
    }

    /// All visits as the user should see them, overlays applied.
    pub async fn snapshot(&self) -> Vec<Visit> {
        let state = self.state.read().await;
        state.visits.iter().map(|v| state.overlay(v)).collect()
    }

    pub async fn get(&self, id: &VisitId) -> Option<Visit> {
        let state = self.state.read().await;
        state
            .visits
            .iter()
            .find(|v| v.id() == id)
            .map(|v| state.overlay(v))
    }

    /// Records a local purpose edit and returns the visit with it applied.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the visit is not cached
    /// - `ValidationFailed` if the index is out of range or the purpose too long
    pub async fn set_pending_purpose(
        &self,
        id: &VisitId,
        segment_index: usize,
        purpose: String,
    ) -> Result<(Visit, u64), VisitError> {
        let mut state = self.state.write().await;
        let base = state
            .visits
            .iter()
            .find(|v| v.id() == id)
            .cloned()
            .ok_or_else(|| VisitError::not_found(id.clone()))?;

        let mut view = state.overlay(&base);
        view.set_segment_purpose(segment_index, purpose.clone())?;

        state.next_generation += 1;
        let generation = state.next_generation;
        state
            .overlays
            .insert((id.clone(), segment_index), PendingPurpose { purpose, generation });
        Ok((view, generation))
    }

    /// Pending edits for one visit, ordered by segment.
    pub async fn pending_for(&self, id: &VisitId) -> Vec<PendingEdit> {
        let state = self.state.read().await;
        let mut edits: Vec<PendingEdit> = state
            .overlays
            .iter()
            .filter(|((visit_id, _), _)| visit_id == id)
            .map(|((_, index), pending)| PendingEdit {
                segment_index: *index,
                purpose: pending.purpose.clone(),
                generation: pending.generation,
            })
            .collect();
        edits.sort_by_key(|edit| edit.segment_index);
        edits
    }

    /// Clears an overlay once its value is stored, unless a newer edit of the
    /// same segment arrived meanwhile. Returns whether it was cleared.
    pub async fn clear_pending(&self, id: &VisitId, segment_index: usize, generation: u64) -> bool {
        let mut state = self.state.write().await;
        let key = (id.clone(), segment_index);
        match state.overlays.get(&key) {
            Some(pending) if pending.generation == generation => {
                state.overlays.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub async fn has_pending(&self, id: &VisitId) -> bool {
        self.state
            .read()
            .await
            .overlays
            .keys()
            .any(|(visit_id, _)| visit_id == id)
    }

    /// Visits that still carry unsaved edits.
    pub async fn visits_with_pending(&self) -> Vec<VisitId> {
        let state = self.state.read().await;
        let mut ids: Vec<VisitId> = state.overlays.keys().map(|(id, _)| id.clone()).collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::visit::{HostTarget, VisitorDetails};

    fn visit(id: &str, purpose: &str) -> Visit {
        Visit::walk_in(
            VisitId::new(id).unwrap(),
            VisitorDetails::new("Asha"),
            HostTarget::new("Admissions"),
            Some(purpose.to_string()),
            1,
            Timestamp::parse("2024-05-01T04:30:00Z").unwrap(),
        )
        .unwrap()
    }

    fn id(value: &str) -> VisitId {
        VisitId::new(value).unwrap()
    }

    #[tokio::test]
    async fn pending_edit_is_visible_immediately() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Enquiry")]).await;

        let (view, _) = cache
            .set_pending_purpose(&id("a"), 0, "Course shortlist".into())
            .await
            .unwrap();

        assert_eq!(view.segments()[0].purpose, "Course shortlist");
        assert_eq!(cache.get(&id("a")).await.unwrap().segments()[0].purpose, "Course shortlist");
    }

    #[tokio::test]
    async fn refresh_keeps_pending_overlay() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Enquiry")]).await;
        cache
            .set_pending_purpose(&id("a"), 0, "Local text".into())
            .await
            .unwrap();

        cache.replace_all(vec![visit("a", "Remote text")]).await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot[0].segments()[0].purpose, "Local text");
        assert!(cache.has_pending(&id("a")).await);
    }

    #[tokio::test]
    async fn clear_ignores_stale_generation() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Enquiry")]).await;
        let (_, first) = cache.set_pending_purpose(&id("a"), 0, "one".into()).await.unwrap();
        let (_, second) = cache.set_pending_purpose(&id("a"), 0, "two".into()).await.unwrap();

        assert!(!cache.clear_pending(&id("a"), 0, first).await);
        assert!(cache.has_pending(&id("a")).await);
        assert!(cache.clear_pending(&id("a"), 0, second).await);
        assert!(cache.visits_with_pending().await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_segment_is_rejected() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Enquiry")]).await;

        let err = cache
            .set_pending_purpose(&id("a"), 3, "nope".into())
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::ValidationFailed { .. }));
        assert!(!cache.has_pending(&id("a")).await);
    }

    #[tokio::test]
    async fn unknown_visit_is_not_found() {
        let cache = VisitCache::new();
        let err = cache
            .set_pending_purpose(&id("ghost"), 0, "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::NotFound(_)));
    }

    #[tokio::test]
    async fn refresh_read_before_a_write_keeps_the_written_visit() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Old"), visit("b", "Other")]).await;

        let started = cache.begin_refresh().await;
        cache.upsert(visit("a", "New")).await;
        let applied = cache
            .apply_refresh(started, vec![visit("a", "Old"), visit("b", "Remote")])
            .await;

        assert!(applied);
        assert_eq!(cache.get(&id("a")).await.unwrap().segments()[0].purpose, "New");
        assert_eq!(cache.get(&id("b")).await.unwrap().segments()[0].purpose, "Remote");
    }

    #[tokio::test]
    async fn refresh_read_before_a_removal_does_not_resurrect() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Enquiry")]).await;

        let started = cache.begin_refresh().await;
        cache.remove(&id("a")).await;
        cache.apply_refresh(started, vec![visit("a", "Enquiry")]).await;

        assert!(cache.get(&id("a")).await.is_none());
    }

    #[tokio::test]
    async fn later_refresh_takes_the_written_visit_from_the_store() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Old")]).await;
        let started = cache.begin_refresh().await;
        cache.upsert(visit("a", "New")).await;
        cache.apply_refresh(started, vec![visit("a", "Old")]).await;

        cache.replace_all(vec![visit("a", "Remote edit")]).await;

        assert_eq!(cache.get(&id("a")).await.unwrap().segments()[0].purpose, "Remote edit");
    }

    #[tokio::test]
    async fn older_snapshot_is_dropped_after_a_newer_one() {
        let cache = VisitCache::new();
        let first = cache.begin_refresh().await;
        cache.upsert(visit("a", "Enquiry")).await;
        let second = cache.begin_refresh().await;

        assert!(cache.apply_refresh(second, vec![visit("a", "Fresh")]).await);
        assert!(!cache.apply_refresh(first, vec![]).await);
        assert_eq!(cache.get(&id("a")).await.unwrap().segments()[0].purpose, "Fresh");
    }

    #[tokio::test]
    async fn remove_drops_overlays() {
        let cache = VisitCache::new();
        cache.replace_all(vec![visit("a", "Enquiry")]).await;
        cache.set_pending_purpose(&id("a"), 0, "x".into()).await.unwrap();

        cache.remove(&id("a")).await;
        assert!(cache.get(&id("a")).await.is_none());
        assert!(!cache.has_pending(&id("a")).await);
    }
}
