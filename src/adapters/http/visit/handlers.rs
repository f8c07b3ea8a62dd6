//! HTTP handlers for visit, queue and reception endpoints.
//!
//! Every handler resolves the staff member from gateway headers, calls the
//! [`FrontDesk`] facade and maps the outcome onto a status code.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireStaff;
use crate::application::{
    ForwardVisitCommand, FrontDesk, RecordMilestoneCommand, ScheduleVisitCommand,
    UpdateVisitDetailsCommand, WalkInCommand,
};
use crate::domain::foundation::{ContactId, DomainError, ValidationError, VisitId};
use crate::domain::queue::Viewer;
use crate::domain::visit::{SegmentAction, VisitError};

use super::dto::{
    CallNextResponse, DisplayBoardResponse, EditPurposeRequest, EditPurposeResponse, ErrorResponse,
    ForwardVisitRequest, QueueParams, QueueResponse, ReceptionLogParams, ReceptionLogResponse,
    ReceptionSummaryResponse, RecordMilestoneRequest, ScheduleVisitRequest, UpdateVisitRequest,
    VisitDetailResponse, VisitResponse, WalkInRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state of the visit API.
#[derive(Clone)]
pub struct VisitAppState {
    pub front_desk: Arc<FrontDesk>,
}

impl VisitAppState {
    pub fn new(front_desk: Arc<FrontDesk>) -> Self {
        Self { front_desk }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

/// A [`VisitError`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub VisitError);

impl From<VisitError> for ApiError {
    fn from(err: VisitError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(VisitError::from(DomainError::from(err)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            VisitError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            VisitError::Forbidden { .. } => StatusCode::FORBIDDEN,
            VisitError::NotFound(_) => StatusCode::NOT_FOUND,
            VisitError::InvalidTransition(_) => StatusCode::CONFLICT,
            VisitError::Transport(message) => {
                tracing::warn!(error = %message, "visit store call failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let mut body = ErrorResponse::new(err.code().to_string(), err.message());
        if err.is_retryable() {
            body.retryable = Some(true);
        }
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn visit_id(raw: String) -> Result<VisitId, ApiError> {
    Ok(VisitId::new(raw)?)
}

// ════════════════════════════════════════════════════════════════════════════
// Visit lifecycle
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/visits - Reception log, with optional `search` and `status`
pub async fn list_visits(
    State(state): State<VisitAppState>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<ReceptionLogParams>,
) -> ApiResult<Json<ReceptionLogResponse>> {
    let log = state.front_desk.reception_log(params.into_filter()?).await?;
    Ok(Json(log.into()))
}

/// POST /api/visits/schedule - Schedule an appointment
pub async fn schedule_visit(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Json(req): Json<ScheduleVisitRequest>,
) -> ApiResult<impl IntoResponse> {
    let cmd = ScheduleVisitCommand {
        details: req.visitor.into_details()?,
        target: req.target.into_target(),
        scheduled_check_in_time: req.scheduled_check_in_time,
        purpose: req.purpose,
    };
    let visit = state.front_desk.schedule(cmd, staff.metadata()).await?;
    Ok((StatusCode::CREATED, Json(VisitResponse::from(visit))))
}

/// POST /api/visits/walk-in - Check in a visitor without an appointment
pub async fn walk_in(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Json(req): Json<WalkInRequest>,
) -> ApiResult<impl IntoResponse> {
    let cmd = WalkInCommand {
        details: req.visitor.into_details()?,
        target: req.target.into_target(),
        purpose: req.purpose,
    };
    let visit = state.front_desk.walk_in(cmd, staff.metadata()).await?;
    Ok((StatusCode::CREATED, Json(VisitResponse::from(visit))))
}

/// GET /api/visits/:id - Visit with its journey
pub async fn get_visit(
    State(state): State<VisitAppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<String>,
) -> ApiResult<Json<VisitDetailResponse>> {
    let view = state.front_desk.visit(visit_id(id)?).await?;
    Ok(Json(view.into()))
}

/// PATCH /api/visits/:id - Edit visitor details
pub async fn update_visit(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
    Json(req): Json<UpdateVisitRequest>,
) -> ApiResult<Json<VisitResponse>> {
    let cmd = UpdateVisitDetailsCommand {
        visit_id: visit_id(id)?,
        patch: req.into_patch()?,
    };
    let visit = state.front_desk.update_details(cmd, staff.metadata()).await?;
    Ok(Json(visit.into()))
}

/// DELETE /api/visits/:id - Administrative removal
pub async fn delete_visit(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.front_desk.delete(visit_id(id)?, staff.metadata()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/visits/:id/check-in - Check in a scheduled visitor
pub async fn check_in(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
) -> ApiResult<Json<VisitResponse>> {
    let visit = state.front_desk.check_in(visit_id(id)?, staff.metadata()).await?;
    Ok(Json(visit.into()))
}

/// POST /api/visits/:id/check-out - Check a visitor out
pub async fn check_out(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
) -> ApiResult<Json<VisitResponse>> {
    let visit = state.front_desk.check_out(visit_id(id)?, staff.metadata()).await?;
    Ok(Json(visit.into()))
}

/// POST /api/visits/:id/call - Call a waiting visitor
pub async fn call_visitor(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
) -> ApiResult<Json<VisitResponse>> {
    let visit = state.front_desk.call(visit_id(id)?, staff.metadata()).await?;
    Ok(Json(visit.into()))
}

/// POST /api/visits/:id/forward - Send a visitor on to another stop
pub async fn forward_visit(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
    Json(req): Json<ForwardVisitRequest>,
) -> ApiResult<Json<VisitResponse>> {
    let cmd = ForwardVisitCommand {
        visit_id: visit_id(id)?,
        target: req.target.into_target(),
        purpose: req.purpose,
    };
    let visit = state.front_desk.forward(cmd, staff.metadata()).await?;
    Ok(Json(visit.into()))
}

/// POST /api/visits/:id/milestone - Record a milestone on the current stop
pub async fn record_milestone(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
    Json(req): Json<RecordMilestoneRequest>,
) -> ApiResult<Json<VisitResponse>> {
    let action = SegmentAction::parse(&req.action)
        .ok_or_else(|| VisitError::validation("action", "Milestone action is required"))?;
    let cmd = RecordMilestoneCommand {
        visit_id: visit_id(id)?,
        action,
    };
    let visit = state.front_desk.record_milestone(cmd, staff.metadata()).await?;
    Ok(Json(visit.into()))
}

/// PUT /api/visits/:id/segments/:index/purpose - Optimistic purpose edit
///
/// Answers 202 with the locally applied visit; the write follows after the
/// debounce window.
pub async fn edit_purpose(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Path((id, index)): Path<(String, usize)>,
    Json(req): Json<EditPurposeRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = visit_id(id)?;
    let visit = state
        .front_desk
        .edit_purpose(&id, index, req.purpose, staff.metadata())
        .await?;
    let status = state.front_desk.edit_status(&id);
    Ok((
        StatusCode::ACCEPTED,
        Json(EditPurposeResponse::new(&visit, status)),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Queue and reception reads
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/queue?mode=mine|all - Live queue for the caller
pub async fn get_queue(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Query(params): Query<QueueParams>,
) -> ApiResult<Json<QueueResponse>> {
    let viewer = Viewer::from(&staff.actor);
    let projection = state
        .front_desk
        .queue_for(&viewer, params.view_mode()?)
        .await?;
    Ok(Json(projection.into()))
}

/// POST /api/queue/call-next - Call the first waiting visitor
///
/// Answers 204 when nobody is waiting. Scheduled visitors who were skipped
/// because they are not checked in are listed in `awaiting_check_in`.
pub async fn call_next(
    State(state): State<VisitAppState>,
    RequireStaff(staff): RequireStaff,
    Query(params): Query<QueueParams>,
) -> ApiResult<Response> {
    let outcome = state
        .front_desk
        .call_next(staff.metadata(), params.view_mode()?)
        .await?;
    Ok(match CallNextResponse::from_outcome(outcome) {
        Some(body) => Json(body).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// GET /api/display - Waiting-room board
pub async fn display_board(
    State(state): State<VisitAppState>,
) -> ApiResult<Json<DisplayBoardResponse>> {
    let board = state.front_desk.display_board().await?;
    Ok(Json(board.into()))
}

/// GET /api/reception/summary - Headline counters
pub async fn reception_summary(
    State(state): State<VisitAppState>,
    RequireStaff(_staff): RequireStaff,
) -> ApiResult<Json<ReceptionSummaryResponse>> {
    let summary = state.front_desk.reception_summary().await?;
    Ok(Json(summary.into()))
}

/// GET /api/contacts/:id/visits - Visit history of one contact
pub async fn contact_visits(
    State(state): State<VisitAppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<VisitResponse>>> {
    let history = state.front_desk.contact_history(ContactId::new(id)?).await?;
    Ok(Json(history.iter().map(VisitResponse::from).collect()))
}

/// GET /health - Liveness
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
