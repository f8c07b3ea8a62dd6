//! HTTP adapter for visit, queue and reception endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CallNextResponse, DisplayBoardResponse, EditPurposeRequest, EditPurposeResponse, ErrorResponse,
    ForwardVisitRequest, QueueResponse, ReceptionLogResponse, ReceptionSummaryResponse,
    RecordMilestoneRequest, ScheduleVisitRequest, UpdateVisitRequest, VisitDetailResponse,
    VisitResponse, WalkInRequest,
};
pub use handlers::{health, ApiError, VisitAppState};
pub use routes::visit_router;
