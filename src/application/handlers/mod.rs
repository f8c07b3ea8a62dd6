//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod queue;
pub mod visit;

pub use queue::{
    GetDisplayBoardHandler, GetReceptionLogHandler, GetReceptionLogQuery,
    GetReceptionSummaryHandler,
};
pub use visit::{
    // Commands
    CallVisitorCommand, CallVisitorHandler,
    CheckInLock,
    CheckInVisitCommand, CheckInVisitHandler,
    CheckOutVisitCommand, CheckOutVisitHandler,
    DeleteVisitCommand, DeleteVisitHandler,
    ForwardVisitCommand, ForwardVisitHandler,
    RecordMilestoneCommand, RecordMilestoneHandler,
    ScheduleVisitCommand, ScheduleVisitHandler,
    UpdateVisitDetailsCommand, UpdateVisitDetailsHandler,
    WalkInCommand, WalkInHandler,
    // Queries
    GetVisitHandler, GetVisitQuery, VisitView,
    ListContactVisitsHandler, ListContactVisitsQuery,
};
