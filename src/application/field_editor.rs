//! FieldEditor - optimistic editing of segment purposes.
//!
//! An edit lands in the [`VisitCache`] immediately and arms a debounce timer
//! for its `(visit, segment)` pair. When the timer fires the visit is
//! persisted by re-reading the current record, overlaying every pending
//! purpose for that visit, and writing the whole record back.
//!
//! ## Failure handling
//!
//! Transport failures are retried with linear backoff up to
//! `max_retries` times. After that the edit stays in the cache and the visit
//! is reported as [`EditStatus::Unsaved`] until `retry()` or `flush()`
//! succeeds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::foundation::VisitId;
use crate::domain::visit::{Visit, VisitError};
use crate::ports::VisitStore;

use super::cache::{PendingEdit, VisitCache};
use super::coalescer::WriteCoalescer;
use super::handlers::visit::load_visit;

/// Configuration for the FieldEditor.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Quiet period before an edit is written.
    pub debounce: Duration,

    /// Additional attempts after a failed write.
    pub max_retries: u32,

    /// Base delay between attempts; attempt `n` waits `n * retry_backoff`.
    pub retry_backoff: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(1),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl EditorConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }
}

/// Save state of a visit's purpose edits, as shown next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStatus {
    Pending,
    Saving,
    Saved,
    Unsaved(String),
}

type EditKey = (VisitId, usize);

struct EditorInner {
    store: Arc<dyn VisitStore>,
    cache: VisitCache,
    coalescer: WriteCoalescer<EditKey>,
    config: EditorConfig,
    statuses: Mutex<HashMap<VisitId, EditStatus>>,
    // One persist at a time so two timers never interleave read and write.
    persist_lock: tokio::sync::Mutex<()>,
}

/// Debounced, coalescing editor for segment purposes.
#[derive(Clone)]
pub struct FieldEditor {
    inner: Arc<EditorInner>,
}

impl FieldEditor {
    pub fn new(store: Arc<dyn VisitStore>, cache: VisitCache, config: EditorConfig) -> Self {
        Self {
            inner: Arc::new(EditorInner {
                store,
                cache,
                coalescer: WriteCoalescer::new(config.debounce),
                config,
                statuses: Mutex::new(HashMap::new()),
                persist_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.inner.config
    }

    /// Applies a purpose edit locally and arms its write.
    ///
    /// Returns the visit as the user now sees it. A visit missing from the
    /// cache is read from the store first.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the visit does not exist
    /// - `ValidationFailed` if the index is out of range or the purpose too long
    /// - `Transport` if the visit had to be read and the read failed
    pub async fn edit_purpose(
        &self,
        visit_id: &VisitId,
        segment_index: usize,
        purpose: impl Into<String>,
    ) -> Result<Visit, VisitError> {
        let inner = &self.inner;
        if inner.cache.get(visit_id).await.is_none() {
            let visit = load_visit(inner.store.as_ref(), visit_id).await?;
            inner.cache.upsert(visit).await;
        }

        let (view, _) = inner
            .cache
            .set_pending_purpose(visit_id, segment_index, purpose.into())
            .await?;
        inner.set_status(visit_id, EditStatus::Pending);
        self.arm(visit_id.clone(), segment_index);

        tracing::debug!(visit_id = %visit_id, segment_index, "purpose edit pending");
        Ok(view)
    }

    fn arm(&self, visit_id: VisitId, segment_index: usize) {
        let inner = Arc::clone(&self.inner);
        let target = visit_id.clone();
        self.inner.coalescer.schedule((visit_id, segment_index), move || async move {
            // Failures are recorded in the status map.
            let _ = inner.persist(&target).await;
        });
    }

    /// Writes any pending edits of `visit_id` now, disarming its timers.
    pub async fn flush(&self, visit_id: &VisitId) -> Result<(), VisitError> {
        self.inner.coalescer.cancel_where(|(id, _)| id == visit_id);
        self.inner.persist(visit_id).await
    }

    /// Drops timers and status for a visit that no longer exists.
    pub fn discard(&self, visit_id: &VisitId) {
        self.inner.coalescer.cancel_where(|(id, _)| id == visit_id);
        self.inner
            .statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(visit_id);
    }

    /// Re-arms writes for a visit whose edits were left unsaved.
    ///
    /// Returns the number of timers armed.
    pub async fn retry(&self, visit_id: &VisitId) -> usize {
        let pending = self.inner.cache.pending_for(visit_id).await;
        if pending.is_empty() {
            return 0;
        }
        self.inner.set_status(visit_id, EditStatus::Pending);
        for edit in &pending {
            self.arm(visit_id.clone(), edit.segment_index);
        }
        pending.len()
    }

    /// Cancels every timer and writes everything still pending.
    ///
    /// Returns the visits that could not be saved.
    pub async fn shutdown(&self) -> Vec<VisitId> {
        self.inner.coalescer.cancel_all();
        let mut unsaved = Vec::new();
        for visit_id in self.inner.cache.visits_with_pending().await {
            if self.inner.persist(&visit_id).await.is_err() {
                unsaved.push(visit_id);
            }
        }
        tracing::info!(unsaved = unsaved.len(), "field editor shut down");
        unsaved
    }

    pub fn status(&self, visit_id: &VisitId) -> Option<EditStatus> {
        self.inner
            .statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(visit_id)
            .cloned()
    }

    pub fn armed_timers(&self) -> usize {
        self.inner.coalescer.armed_count()
    }
}

impl EditorInner {
    fn set_status(&self, visit_id: &VisitId, status: EditStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(visit_id.clone(), status);
    }

    async fn persist(&self, visit_id: &VisitId) -> Result<(), VisitError> {
        let _guard = self.persist_lock.lock().await;

        let pending = self.cache.pending_for(visit_id).await;
        if pending.is_empty() {
            return Ok(());
        }
        self.set_status(visit_id, EditStatus::Saving);

        let mut attempt = 0;
        loop {
            match self.write_merged(visit_id, &pending).await {
                Ok(stored) => {
                    self.cache.upsert(stored).await;
                    for edit in &pending {
                        self.cache
                            .clear_pending(visit_id, edit.segment_index, edit.generation)
                            .await;
                    }
                    let status = if self.cache.has_pending(visit_id).await {
                        EditStatus::Pending
                    } else {
                        EditStatus::Saved
                    };
                    self.set_status(visit_id, status);
                    tracing::info!(
                        visit_id = %visit_id,
                        fields = pending.len(),
                        attempts = attempt + 1,
                        "purpose edits saved"
                    );
                    return Ok(());
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        visit_id = %visit_id,
                        attempt,
                        error = %err,
                        "purpose write failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(err) => {
                    tracing::error!(visit_id = %visit_id, error = %err, "purpose edits unsaved");
                    self.set_status(visit_id, EditStatus::Unsaved(err.to_string()));
                    return Err(err);
                }
            }
        }
    }

    async fn write_merged(&self, visit_id: &VisitId, pending: &[PendingEdit]) -> Result<Visit, VisitError> {
        let mut current = load_visit(self.store.as_ref(), visit_id).await?;
        for edit in pending {
            current.set_segment_purpose(edit.segment_index, edit.purpose.clone())?;
        }
        Ok(self.store.update_visit(&current).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;
    use crate::domain::visit::HostTarget;

    fn id(value: &str) -> VisitId {
        VisitId::new(value).unwrap()
    }

    async fn setup(visits: Vec<Visit>) -> (Arc<InMemoryVisitStore>, VisitCache, FieldEditor) {
        let store = Arc::new(InMemoryVisitStore::with_visits(visits.clone()));
        let cache = VisitCache::new();
        cache.replace_all(visits).await;
        let config = EditorConfig::default().with_retries(2, Duration::from_millis(100));
        let editor = FieldEditor::new(store.clone(), cache.clone(), config);
        (store, cache, editor)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_writes_once_with_last_value() {
        let (store, _, editor) = setup(vec![walk_in("a", "Admissions", 1, start())]).await;

        for text in ["C", "Co", "Course"] {
            editor.edit_purpose(&id("a"), 0, text).await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert!(store.writes_for(&id("a")).await.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;

        let writes = store.writes_for(&id("a")).await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].segments()[0].purpose, "Course");
        assert_eq!(editor.status(&id("a")), Some(EditStatus::Saved));
    }

    #[tokio::test(start_paused = true)]
    async fn edit_is_visible_before_write() {
        let (store, cache, editor) = setup(vec![walk_in("a", "Admissions", 1, start())]).await;

        let view = editor.edit_purpose(&id("a"), 0, "Loan papers").await.unwrap();

        assert_eq!(view.segments()[0].purpose, "Loan papers");
        assert_eq!(cache.get(&id("a")).await.unwrap().segments()[0].purpose, "Loan papers");
        assert_eq!(store.update_calls(), 0);
        assert_eq!(editor.status(&id("a")), Some(EditStatus::Pending));
    }

    #[tokio::test(start_paused = true)]
    async fn merge_keeps_concurrent_remote_changes() {
        let (store, _, editor) = setup(vec![walk_in("a", "Admissions", 1, start())]).await;
        editor.edit_purpose(&id("a"), 0, "Scholarship query").await.unwrap();

        // Another desk forwards the visitor before the debounce fires.
        let mut remote = store.get_visit(&id("a")).await.unwrap().unwrap();
        remote
            .forward(HostTarget::new("Finance"), None, "Ravi", start().plus_secs(30))
            .unwrap();
        store.put(remote).await;

        tokio::time::sleep(Duration::from_secs(2)).await;

        let stored = store.get_visit(&id("a")).await.unwrap().unwrap();
        assert_eq!(stored.segments().len(), 2);
        assert_eq!(stored.segments()[0].purpose, "Scholarship query");
        assert_eq!(stored.primary_host(), "Finance");
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_is_retried() {
        let (store, _, editor) = setup(vec![walk_in("a", "Admissions", 1, start())]).await;
        store.fail_next(1);

        editor.edit_purpose(&id("a"), 0, "Visa slot").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(store.writes_for(&id("a")).await.len(), 1);
        assert_eq!(editor.status(&id("a")), Some(EditStatus::Saved));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_leave_edit_unsaved_until_retry() {
        let (store, cache, editor) = setup(vec![walk_in("a", "Admissions", 1, start())]).await;
        store.fail_next(3);

        editor.edit_purpose(&id("a"), 0, "Visa slot").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(matches!(editor.status(&id("a")), Some(EditStatus::Unsaved(_))));
        assert!(cache.has_pending(&id("a")).await);
        assert_eq!(cache.get(&id("a")).await.unwrap().segments()[0].purpose, "Visa slot");

        assert_eq!(editor.retry(&id("a")).await, 1);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(editor.status(&id("a")), Some(EditStatus::Saved));
        assert!(!cache.has_pending(&id("a")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_and_disarms() {
        let (store, _, editor) = setup(vec![walk_in("a", "Admissions", 1, start())]).await;
        editor.edit_purpose(&id("a"), 0, "Final").await.unwrap();

        editor.flush(&id("a")).await.unwrap();
        assert_eq!(store.writes_for(&id("a")).await.len(), 1);
        assert_eq!(editor.armed_timers(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.writes_for(&id("a")).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_everything() {
        let (store, _, editor) = setup(vec![
            walk_in("a", "Admissions", 1, start()),
            walk_in("b", "Finance", 2, start()),
        ])
        .await;
        editor.edit_purpose(&id("a"), 0, "one").await.unwrap();
        editor.edit_purpose(&id("b"), 0, "two").await.unwrap();

        let unsaved = editor.shutdown().await;

        assert!(unsaved.is_empty());
        assert_eq!(store.write_log().await.len(), 2);
        assert_eq!(editor.armed_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn uncached_visit_is_loaded_from_store() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "a",
            "Admissions",
            1,
            start(),
        )]));
        let editor = FieldEditor::new(store, VisitCache::new(), EditorConfig::default());

        let view = editor.edit_purpose(&id("a"), 0, "Hello").await.unwrap();
        assert_eq!(view.segments()[0].purpose, "Hello");
    }
}
