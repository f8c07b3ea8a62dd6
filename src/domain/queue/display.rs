//! Public waiting-room board.

use chrono::Duration;

use crate::domain::foundation::{Timestamp, VisitId};
use crate::domain::visit::{Visit, VisitStatus};

use super::queue_order;

/// One row on the waiting-room board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub visit_id: VisitId,
    pub ticket: Option<u32>,
    pub visitor_name: String,
    pub waiting_for: String,
    pub purpose: String,
    pub wait_minutes: Option<i64>,
    pub is_calling: bool,
}

/// Everyone on premises, plus who is being called right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBoard {
    pub generated_at: Timestamp,
    pub rows: Vec<BoardRow>,
    /// Visitors inside their call window, most recent call first.
    pub now_calling: Vec<BoardRow>,
}

impl DisplayBoard {
    pub fn build(visits: &[Visit], now: &Timestamp, call_window: Duration) -> Self {
        let mut present: Vec<&Visit> = visits
            .iter()
            .filter(|visit| visit.status() == VisitStatus::CheckedIn)
            .collect();
        present.sort_by(|a, b| queue_order(a, b));

        let row = |visit: &Visit| BoardRow {
            visit_id: visit.id().clone(),
            ticket: visit.daily_sequence_number(),
            visitor_name: visit.visitor_name().to_string(),
            waiting_for: visit.target().to_string(),
            purpose: visit.last_segment().purpose.clone(),
            wait_minutes: visit
                .check_in_time()
                .map(|check_in| now.duration_since(check_in).num_minutes().max(0)),
            is_calling: visit.is_calling(now, call_window),
        };

        let mut calling: Vec<&Visit> = present
            .iter()
            .copied()
            .filter(|visit| visit.is_calling(now, call_window))
            .collect();
        calling.sort_by(|a, b| b.called_at().cmp(&a.called_at()));

        Self {
            generated_at: *now,
            rows: present.into_iter().map(row).collect(),
            now_calling: calling.into_iter().map(row).collect(),
        }
    }

    /// Calls that started after `since`; the board raises an alert for these.
    pub fn new_calls_since<'a>(&'a self, visits: &'a [Visit], since: &Timestamp) -> Vec<&'a BoardRow> {
        self.now_calling
            .iter()
            .filter(|row| {
                visits
                    .iter()
                    .find(|visit| visit.id() == &row.visit_id)
                    .and_then(|visit| visit.called_at())
                    .map(|called_at| called_at.is_after(since))
                    .unwrap_or(false)
            })
            .collect()
    }
}
