//! Reception desk views: headline counters and the searchable visit log.

use std::cmp::Ordering;

use crate::domain::foundation::Timestamp;
use crate::domain::visit::{DailySequencer, Visit, VisitStatus};

/// Headline counters shown above the reception log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceptionSummary {
    /// Visits whose check-in falls on today's business date.
    pub visitors_today: usize,
    pub currently_checked_in: usize,
    /// Scheduled visits whose appointment is today.
    pub pending_appointments_today: usize,
}

impl ReceptionSummary {
    pub fn compute(visits: &[Visit], sequencer: &DailySequencer, now: &Timestamp) -> Self {
        let today = sequencer.business_date(now);
        let on_today = |ts: Option<&Timestamp>| {
            ts.map(|t| sequencer.business_date(t) == today)
                .unwrap_or(false)
        };

        visits.iter().fold(Self::default(), |mut summary, visit| {
            if on_today(visit.check_in_time()) {
                summary.visitors_today += 1;
            }
            match visit.status() {
                VisitStatus::CheckedIn => summary.currently_checked_in += 1,
                VisitStatus::Scheduled if on_today(visit.scheduled_check_in_time()) => {
                    summary.pending_appointments_today += 1
                }
                _ => {}
            }
            summary
        })
    }
}

/// Filter applied to the reception log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Case-insensitive match against name, company/phone and current host.
    pub search: Option<String>,
    /// Restricts the log to `CheckedIn` or `CheckedOut`.
    pub status: Option<VisitStatus>,
}

impl LogFilter {
    fn matches_search(&self, visit: &Visit) -> bool {
        let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        let query = query.to_lowercase();
        [visit.visitor_name(), visit.company_or_phone(), visit.primary_host()]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// The reception log split the way the desk reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionLog {
    /// Arrived visits, most recent first.
    pub log: Vec<Visit>,
    /// Upcoming appointments, soonest first.
    pub scheduled: Vec<Visit>,
}

impl ReceptionLog {
    pub fn build(visits: &[Visit], filter: &LogFilter) -> Self {
        let mut log: Vec<Visit> = visits
            .iter()
            .filter(|v| v.status() != VisitStatus::Scheduled)
            .filter(|v| filter.status.map(|s| v.status() == s).unwrap_or(true))
            .filter(|v| filter.matches_search(v))
            .cloned()
            .collect();
        log.sort_by(|a, b| newest_first(a.queue_time(), b.queue_time()));

        let mut scheduled: Vec<Visit> = visits
            .iter()
            .filter(|v| v.status() == VisitStatus::Scheduled)
            .filter(|v| filter.matches_search(v))
            .cloned()
            .collect();
        scheduled.sort_by(|a, b| a.scheduled_check_in_time().cmp(&b.scheduled_check_in_time()));

        Self { log, scheduled }
    }
}

fn newest_first(a: Option<&Timestamp>, b: Option<&Timestamp>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
