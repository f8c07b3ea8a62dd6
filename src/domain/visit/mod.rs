//! Visit module - the visitor lifecycle and its department journey.
//!
//! # Module Structure
//!
//! - `status` - `VisitStatus` state machine
//! - `segment` - `VisitSegment` stops and `SegmentAction` milestones
//! - `aggregate` - `Visit` aggregate entity
//! - `record` - wire/storage shape and legacy upgrade
//! - `sequencing` - daily sequence numbers
//! - `journey` - history view with time spent per stop
//! - `errors` - `VisitError`

mod aggregate;
mod errors;
mod journey;
mod record;
mod segment;
mod sequencing;
mod status;

pub use aggregate::{
    HostTarget, Visit, VisitDetailsPatch, VisitorDetails, MAX_DEPARTMENT_LENGTH, MAX_NAME_LENGTH,
    MAX_PURPOSE_LENGTH, UNKNOWN_COMPANY,
};
pub use errors::VisitError;
pub use journey::{JourneyStop, VisitJourney};
pub use record::{parse_stored_timestamp, SegmentRecord, VisitRecord};
pub use segment::{SegmentAction, VisitSegment};
pub use sequencing::{DailySequencer, DEFAULT_UTC_OFFSET_SECS};
pub use status::VisitStatus;
