//! Daily sequence numbers: the human-facing ticket printed at check-in.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::domain::foundation::{Timestamp, VisitId};

use super::Visit;

/// India Standard Time, the portal's default business day.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Assigns per-calendar-day ordinals.
///
/// The business day is computed in a fixed UTC offset so that a visitor
/// arriving at 00:15 local time counts toward the new day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySequencer {
    offset: FixedOffset,
}

impl DailySequencer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a sequencer from an offset in seconds east of UTC.
    ///
    /// Returns `None` for offsets outside ±24h.
    pub fn from_offset_secs(secs: i32) -> Option<Self> {
        FixedOffset::east_opt(secs).map(Self::new)
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    /// Business date of an instant.
    pub fn business_date(&self, at: &Timestamp) -> NaiveDate {
        at.calendar_date(&self.offset)
    }

    /// Next number for a check-in happening at `at`.
    ///
    /// `visits` is the current snapshot; `subject` (the visit being checked
    /// in, if it already exists) is ignored. The result is one past the larger
    /// of the highest number already issued that day and the number of other
    /// check-ins that day, so it never collides with an issued number even if
    /// older records were never stamped.
    pub fn next_number(&self, visits: &[Visit], subject: Option<&VisitId>, at: &Timestamp) -> u32 {
        let day = self.business_date(at);
        let mut highest = 0u32;
        let mut count = 0u32;

        for visit in visits {
            if Some(visit.id()) == subject {
                continue;
            }
            let Some(check_in) = visit.check_in_time() else {
                continue;
            };
            if self.business_date(check_in) != day {
                continue;
            }
            count += 1;
            if let Some(number) = visit.daily_sequence_number() {
                highest = highest.max(number);
            }
        }

        highest.max(count) + 1
    }
}

impl Default for DailySequencer {
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix()))
    }
}
