//! LiveQueueService - polled, per-viewer waiting queues.
//!
//! The service keeps the [`VisitCache`] current by re-reading the full visit
//! set and re-deriving projections from it. Subscribers get a background task
//! that repeats this on a fixed interval and publishes each projection on a
//! watch channel.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 5s | How often a subscription refreshes |
//! | `call_window` | 60s | How long a call shows as active |
//!
//! ## Shutdown
//!
//! Dropping a [`QueueSubscription`] (or calling `cancel`) stops its task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::foundation::{CommandMetadata, VisitId};
use crate::domain::queue::{QueueProjection, QueueProjector, ViewMode, Viewer};
use crate::domain::visit::{Visit, VisitError};
use crate::ports::{CapabilityChecker, Clock, VisitStore};

use super::cache::VisitCache;
use super::handlers::{CallVisitorCommand, CallVisitorHandler};

/// Default refresh cadence of a subscription.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What a "call next" request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallNextOutcome {
    /// `visit` was called. `passed_over` holds scheduled visitors ahead of it
    /// in the queue.
    Called { visit: Visit, passed_over: Vec<VisitId> },
    /// Only scheduled visitors are waiting; reception must check them in.
    AwaitingCheckIn(Vec<VisitId>),
    NoneWaiting,
}

impl CallNextOutcome {
    pub fn called(&self) -> Option<&Visit> {
        match self {
            CallNextOutcome::Called { visit, .. } => Some(visit),
            _ => None,
        }
    }
}

/// Queue reads, refreshes and the "call next" action.
#[derive(Clone)]
pub struct LiveQueueService {
    store: Arc<dyn VisitStore>,
    cache: VisitCache,
    projector: QueueProjector,
    clock: Arc<dyn Clock>,
    caller: Arc<CallVisitorHandler>,
}

impl LiveQueueService {
    pub fn new(
        store: Arc<dyn VisitStore>,
        checker: Arc<dyn CapabilityChecker>,
        clock: Arc<dyn Clock>,
        cache: VisitCache,
        projector: QueueProjector,
    ) -> Self {
        let caller = Arc::new(CallVisitorHandler::new(
            store.clone(),
            checker,
            clock.clone(),
        ));
        Self {
            store,
            cache,
            projector,
            clock,
            caller,
        }
    }

    pub fn cache(&self) -> &VisitCache {
        &self.cache
    }

    pub fn projector(&self) -> &QueueProjector {
        &self.projector
    }

    /// Re-reads every visit into the cache. Returns the number of visits.
    ///
    /// On failure the cache keeps its previous snapshot. Writes that land
    /// while the store is being read are not undone by the snapshot.
    pub async fn refresh(&self) -> Result<usize, VisitError> {
        let started = self.cache.begin_refresh().await;
        let visits = self.store.list_visits().await?;
        let count = visits.len();
        if self.cache.apply_refresh(started, visits).await {
            tracing::debug!(visits = count, "queue snapshot refreshed");
        } else {
            tracing::debug!(visits = count, "stale queue snapshot dropped");
        }
        Ok(count)
    }

    /// Projects the cached snapshot for `viewer`.
    pub async fn project(&self, viewer: &Viewer, mode: ViewMode) -> QueueProjection {
        let visits = self.cache.snapshot().await;
        self.projector.project(&visits, viewer, mode, &self.clock.now())
    }

    /// Refreshes, then projects.
    pub async fn current(&self, viewer: &Viewer, mode: ViewMode) -> Result<QueueProjection, VisitError> {
        self.refresh().await?;
        Ok(self.project(viewer, mode).await)
    }

    /// Calls the first waiting visitor in the actor's queue.
    ///
    /// Scheduled visitors ahead of the one called are reported back, since
    /// they cannot be called until reception checks them in.
    pub async fn call_next(
        &self,
        metadata: CommandMetadata,
        mode: ViewMode,
    ) -> Result<CallNextOutcome, VisitError> {
        let viewer = Viewer::from(&metadata.actor);
        let projection = self.current(&viewer, mode).await?;
        let passed_over: Vec<VisitId> = projection
            .awaiting_arrival()
            .iter()
            .map(|entry| entry.visit.id().clone())
            .collect();

        let Some(next) = projection.next_to_call() else {
            if passed_over.is_empty() {
                tracing::info!(
                    viewer = %viewer.id,
                    waiting = projection.len(),
                    "no waiting visitors to call"
                );
                return Ok(CallNextOutcome::NoneWaiting);
            }
            tracing::info!(
                viewer = %viewer.id,
                not_checked_in = passed_over.len(),
                "queue head has not been checked in"
            );
            return Ok(CallNextOutcome::AwaitingCheckIn(passed_over));
        };
        if !passed_over.is_empty() {
            tracing::info!(
                viewer = %viewer.id,
                next = %next.visit.id(),
                not_checked_in = passed_over.len(),
                "passing over scheduled visitors who have not been checked in"
            );
        }

        let called = self
            .caller
            .handle(
                CallVisitorCommand {
                    visit_id: next.visit.id().clone(),
                },
                metadata,
            )
            .await?;
        self.cache.upsert(called.clone()).await;
        Ok(CallNextOutcome::Called {
            visit: called,
            passed_over,
        })
    }

    /// Starts a background task publishing `viewer`'s queue every `interval`.
    pub fn subscribe(&self, viewer: Viewer, mode: ViewMode, interval: Duration) -> QueueSubscription {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (updates_tx, updates_rx) = watch::channel(None);
        let service = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        if let Err(err) = service.refresh().await {
                            // Keep publishing from the last good snapshot.
                            tracing::warn!(viewer = %viewer.id, error = %err, "queue refresh failed");
                        }
                        let projection = service.project(&viewer, mode).await;
                        if updates_tx.send(Some(projection)).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(viewer = %viewer.id, "queue subscription stopped");
        });

        QueueSubscription {
            updates: updates_rx,
            shutdown: shutdown_tx,
            handle: Some(handle),
        }
    }
}

/// Handle to a polling task. Stops the task when dropped.
pub struct QueueSubscription {
    updates: watch::Receiver<Option<QueueProjection>>,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl QueueSubscription {
    /// Most recent projection, if one has been published.
    pub fn latest(&self) -> Option<QueueProjection> {
        self.updates.borrow().clone()
    }

    /// Waits for the next projection. Returns `None` once the task ended.
    pub async fn next(&mut self) -> Option<QueueProjection> {
        self.updates.changed().await.ok()?;
        self.updates.borrow_and_update().clone()
    }

    /// Stops the task and waits for it to exit.
    pub async fn cancel(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl Drop for QueueSubscription {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryVisitStore, ManualClock};
    use crate::application::handlers::visit::test_support::*;
    use crate::domain::foundation::{Actor, StaffId, StaffRole};
    use crate::domain::visit::VisitStatus;

    fn service(store: Arc<InMemoryVisitStore>, clock: Arc<ManualClock>) -> LiveQueueService {
        LiveQueueService::new(store, checker(), clock, VisitCache::new(), QueueProjector::default())
    }

    fn admissions_staff() -> CommandMetadata {
        CommandMetadata::new(
            Actor::new(StaffId::new("s-9").unwrap(), "Meera", StaffRole::Staff)
                .with_department("Admissions"),
        )
    }

    fn admissions_viewer() -> Viewer {
        Viewer::new(StaffId::new("s-9").unwrap(), "Meera").with_department("Admissions")
    }

    #[tokio::test]
    async fn projection_reflects_refresh() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![
            walk_in("a", "Admissions", 1, start().plus_secs(-600)),
            walk_in("b", "Finance", 2, start().plus_secs(-300)),
        ]));
        let service = service(store, clock());

        let queue = service
            .current(&admissions_viewer(), ViewMode::Mine)
            .await
            .unwrap();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries[0].visit.id().as_str(), "a");
        assert_eq!(queue.entries[0].wait_minutes, Some(10));
    }

    #[tokio::test]
    async fn call_next_skips_scheduled_and_calling() {
        let mut calling = walk_in("calling", "Admissions", 1, start().plus_secs(-900));
        calling.call(start().plus_secs(-5)).unwrap();
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![
            scheduled("appointment", "Admissions", start().plus_secs(-86_400)),
            calling,
            walk_in("waiting", "Admissions", 2, start().plus_secs(-600)),
        ]));
        let service = service(store, clock());

        let outcome = service
            .call_next(admissions_staff(), ViewMode::Mine)
            .await
            .unwrap();

        let CallNextOutcome::Called { visit, passed_over } = outcome else {
            panic!("expected a call, got {:?}", outcome);
        };
        assert_eq!(visit.id().as_str(), "waiting");
        assert_eq!(visit.called_at(), Some(&start()));
        assert_eq!(passed_over, vec![VisitId::new("appointment").unwrap()]);
    }

    #[tokio::test]
    async fn call_next_reports_queue_head_awaiting_check_in() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![scheduled(
            "appointment",
            "Admissions",
            start().plus_secs(-3600),
        )]));
        let service = service(store.clone(), clock());

        let outcome = service.call_next(admissions_staff(), ViewMode::Mine).await.unwrap();

        assert_eq!(
            outcome,
            CallNextOutcome::AwaitingCheckIn(vec![VisitId::new("appointment").unwrap()])
        );
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn call_next_on_empty_queue_returns_none_waiting() {
        let service = service(Arc::new(InMemoryVisitStore::new()), clock());
        let outcome = service.call_next(admissions_staff(), ViewMode::Mine).await.unwrap();
        assert_eq!(outcome, CallNextOutcome::NoneWaiting);
        assert!(outcome.called().is_none());
    }

    #[tokio::test]
    async fn call_expires_after_window() {
        let clock = clock();
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "a",
            "Admissions",
            1,
            start().plus_secs(-60),
        )]));
        let service = service(store, clock.clone());
        service.call_next(admissions_staff(), ViewMode::Mine).await.unwrap();

        clock.advance_secs(30);
        let queue = service.project(&admissions_viewer(), ViewMode::Mine).await;
        assert!(queue.entries[0].is_calling);
        assert!(queue.next_to_call().is_none());

        clock.advance_secs(31);
        let queue = service.project(&admissions_viewer(), ViewMode::Mine).await;
        assert!(!queue.entries[0].is_calling);
        assert_eq!(queue.entries[0].visit.status(), VisitStatus::CheckedIn);
        assert!(queue.next_to_call().is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "a",
            "Admissions",
            1,
            start(),
        )]));
        let service = service(store.clone(), clock());
        service.refresh().await.unwrap();

        store.fail_next(1);
        assert!(service.refresh().await.is_err());
        assert_eq!(service.project(&admissions_viewer(), ViewMode::Mine).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscription_publishes_until_cancelled() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "a",
            "Admissions",
            1,
            start(),
        )]));
        let service = service(store.clone(), clock());

        let mut subscription =
            service.subscribe(admissions_viewer(), ViewMode::Mine, Duration::from_secs(5));
        let first = subscription.next().await.unwrap();
        assert_eq!(first.len(), 1);

        store
            .put(walk_in("b", "Admissions", 2, start().plus_secs(10)))
            .await;
        let second = subscription.next().await.unwrap();
        assert_eq!(second.len(), 2);

        subscription.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_subscription_stops_polling() {
        let store = Arc::new(InMemoryVisitStore::new());
        let service = service(store.clone(), clock());

        let mut subscription =
            service.subscribe(admissions_viewer(), ViewMode::Mine, Duration::from_secs(1));
        subscription.next().await;
        drop(subscription);

        // The aborted task no longer reads the store.
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.fail_next(1);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.list_visits().await.is_err());
    }
}
