//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write through the `VisitStore`; the cache, live queue and
//! field editor keep a local view that is only updated from successful calls.

pub mod cache;
pub mod coalescer;
pub mod field_editor;
pub mod front_desk;
pub mod handlers;
pub mod live_queue;

pub use cache::{PendingEdit, VisitCache};
pub use coalescer::WriteCoalescer;
pub use field_editor::{EditStatus, EditorConfig, FieldEditor};
pub use front_desk::{FrontDesk, FrontDeskConfig};
pub use handlers::{
    ForwardVisitCommand, RecordMilestoneCommand, ScheduleVisitCommand, UpdateVisitDetailsCommand,
    VisitView, WalkInCommand,
};
pub use live_queue::{CallNextOutcome, LiveQueueService, QueueSubscription, DEFAULT_POLL_INTERVAL};
