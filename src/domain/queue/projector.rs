//! Live queue projection.
//!
//! A projection is recomputed from a full snapshot every time; nothing is
//! diffed incrementally.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Duration;

use crate::domain::foundation::{Timestamp, VisitId};
use crate::domain::visit::{Visit, VisitStatus};

use super::{NameOrDepartmentMatcher, QueueMatcher, ViewMode, Viewer};

/// Default length of the "calling" indicator.
pub const DEFAULT_CALL_WINDOW_SECS: i64 = 60;

/// One waiting visitor as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// 1-based place in the queue.
    pub position: usize,
    pub visit: Visit,
    /// Department or staff label of the current stop.
    pub target: String,
    pub is_calling: bool,
    /// Whole minutes since check-in; `None` before arrival.
    pub wait_minutes: Option<i64>,
}

impl QueueEntry {
    /// Returns true if `call` may be applied now.
    pub fn is_callable(&self) -> bool {
        self.visit.status() == VisitStatus::CheckedIn && !self.is_calling
    }
}

/// Ordered queue for one viewer at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueProjection {
    pub mode: ViewMode,
    pub generated_at: Timestamp,
    pub entries: Vec<QueueEntry>,
}

impl QueueProjection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &VisitId) -> bool {
        self.entries.iter().any(|entry| entry.visit.id() == id)
    }

    /// First entry that can be called right now.
    ///
    /// Scheduled visitors hold their place in line but are skipped until
    /// reception checks them in.
    pub fn next_to_call(&self) -> Option<&QueueEntry> {
        self.entries.iter().find(|entry| entry.is_callable())
    }

    /// Scheduled visitors ahead of [`next_to_call`](Self::next_to_call), or
    /// all scheduled visitors when nobody can be called.
    pub fn awaiting_arrival(&self) -> Vec<&QueueEntry> {
        let cutoff = self.next_to_call().map_or(usize::MAX, |next| next.position);
        self.entries
            .iter()
            .filter(|entry| entry.position < cutoff && entry.visit.status() == VisitStatus::Scheduled)
            .collect()
    }
}

/// Computes per-viewer queues.
#[derive(Clone)]
pub struct QueueProjector {
    matcher: Arc<dyn QueueMatcher>,
    call_window: Duration,
}

impl QueueProjector {
    pub fn new(matcher: Arc<dyn QueueMatcher>, call_window: Duration) -> Self {
        Self {
            matcher,
            call_window,
        }
    }

    pub fn call_window(&self) -> Duration {
        self.call_window
    }

    pub fn matcher(&self) -> &Arc<dyn QueueMatcher> {
        &self.matcher
    }

    /// Builds the queue `viewer` sees in `requested` mode.
    ///
    /// Checked-out visits are dropped. Remaining visits are kept when their
    /// current stop matches the viewer, or unconditionally for an
    /// administrator in `All` mode. Order is earliest arrival first (falling
    /// back to the appointment time), ties broken by sequence number and id;
    /// visits with neither time go last.
    pub fn project(
        &self,
        visits: &[Visit],
        viewer: &Viewer,
        requested: ViewMode,
        now: &Timestamp,
    ) -> QueueProjection {
        let mode = viewer.effective_mode(requested);

        let mut selected: Vec<&Visit> = visits
            .iter()
            .filter(|visit| visit.status().is_open())
            .filter(|visit| mode == ViewMode::All || self.matcher.matches(viewer, visit.target()))
            .collect();
        selected.sort_by(|a, b| queue_order(a, b));

        let entries = selected
            .into_iter()
            .enumerate()
            .map(|(index, visit)| QueueEntry {
                position: index + 1,
                target: visit.target().to_string(),
                is_calling: visit.is_calling(now, self.call_window),
                wait_minutes: visit
                    .check_in_time()
                    .map(|check_in| now.duration_since(check_in).num_minutes().max(0)),
                visit: visit.clone(),
            })
            .collect();

        QueueProjection {
            mode,
            generated_at: *now,
            entries,
        }
    }
}

impl Default for QueueProjector {
    fn default() -> Self {
        Self::new(
            Arc::new(NameOrDepartmentMatcher::new()),
            Duration::seconds(DEFAULT_CALL_WINDOW_SECS),
        )
    }
}

impl std::fmt::Debug for QueueProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueProjector")
            .field("call_window", &self.call_window)
            .finish_non_exhaustive()
    }
}

/// Queue ordering: earliest time first, untimed last, then sequence, then id.
pub fn queue_order(a: &Visit, b: &Visit) -> Ordering {
    let by_time = match (a.queue_time(), b.queue_time()) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time
        .then_with(|| {
            let x = a.daily_sequence_number().unwrap_or(u32::MAX);
            let y = b.daily_sequence_number().unwrap_or(u32::MAX);
            x.cmp(&y)
        })
        .then_with(|| a.id().cmp(b.id()))
}
