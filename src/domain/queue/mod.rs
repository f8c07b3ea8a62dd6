//! Queue module - per-viewer waiting lists and reception read models.
//!
//! Everything here is pure: functions take a snapshot of visits and the
//! current instant and return a freshly computed view.

mod display;
mod matcher;
mod projector;
mod reception;
mod viewer;

pub use display::{BoardRow, DisplayBoard};
pub use matcher::{NameOrDepartmentMatcher, QueueMatcher};
pub use projector::{
    queue_order, QueueEntry, QueueProjection, QueueProjector, DEFAULT_CALL_WINDOW_SECS,
};
pub use reception::{LogFilter, ReceptionLog, ReceptionSummary};
pub use viewer::{ViewMode, Viewer};
