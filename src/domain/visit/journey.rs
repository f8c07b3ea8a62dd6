//! Read-only view of a visit's stops for history screens.

use chrono::Duration;

use crate::domain::foundation::Timestamp;

use super::{SegmentAction, Visit, VisitStatus};

/// One stop with the time spent there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyStop {
    pub index: usize,
    pub department: String,
    pub purpose: String,
    pub action: Option<SegmentAction>,
    pub started_at: Timestamp,
    /// Until the next stop began, check-out, or `now` for the current stop.
    /// `None` while the visitor has not arrived.
    pub time_spent: Option<Duration>,
}

/// The ordered stops of a visit plus its total duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitJourney {
    pub stops: Vec<JourneyStop>,
    pub total: Option<Duration>,
    pub is_open: bool,
}

impl VisitJourney {
    pub fn of(visit: &Visit, now: &Timestamp) -> Self {
        let arrived = visit.status() != VisitStatus::Scheduled;
        let end = visit.check_out_time().copied().unwrap_or(*now);
        let segments = visit.segments();

        let stops = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let until = segments
                    .get(index + 1)
                    .map(|next| next.timestamp)
                    .unwrap_or(end);
                JourneyStop {
                    index,
                    department: segment.department.clone(),
                    purpose: segment.purpose.clone(),
                    action: segment.action.clone(),
                    started_at: segment.timestamp,
                    time_spent: arrived.then(|| until.duration_since(&segment.timestamp)),
                }
            })
            .collect();

        Self {
            stops,
            total: visit.duration(now),
            is_open: visit.status().is_open(),
        }
    }

    /// Departments visited, in order, with consecutive repeats collapsed.
    pub fn route(&self) -> Vec<&str> {
        let mut route: Vec<&str> = Vec::with_capacity(self.stops.len());
        for stop in &self.stops {
            if route.last() != Some(&stop.department.as_str()) {
                route.push(&stop.department);
            }
        }
        route
    }
}
