//! HTTP DTOs for visit endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::{CallNextOutcome, EditStatus, VisitView};
use crate::domain::foundation::{ContactId, Timestamp, ValidationError, VisitId};
use crate::domain::queue::{
    BoardRow, DisplayBoard, LogFilter, QueueEntry, QueueProjection, ReceptionLog,
    ReceptionSummary, ViewMode,
};
use crate::domain::visit::{
    HostTarget, JourneyStop, Visit, VisitDetailsPatch, VisitJourney, VisitSegment, VisitStatus,
    VisitorDetails,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Visitor fields shared by schedule and walk-in requests.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitorFields {
    pub visitor_name: String,
    #[serde(default)]
    pub company_or_phone: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
}

impl VisitorFields {
    pub fn into_details(self) -> Result<VisitorDetails, ValidationError> {
        let mut details = VisitorDetails::new(self.visitor_name);
        if let Some(company) = self.company_or_phone.filter(|c| !c.trim().is_empty()) {
            details = details.with_company_or_phone(company);
        }
        if let Some(contact) = self.contact_id.filter(|c| !c.trim().is_empty()) {
            details = details.with_contact(ContactId::new(contact)?);
        }
        if let Some(card) = self.card_number.filter(|c| !c.trim().is_empty()) {
            details = details.with_card_number(card);
        }
        Ok(details)
    }
}

/// Department or staff member a visit is routed to.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetFields {
    pub department: String,
    #[serde(default)]
    pub host_email: Option<String>,
}

impl TargetFields {
    pub fn into_target(self) -> HostTarget {
        let target = HostTarget::new(self.department);
        match self.host_email.filter(|e| !e.trim().is_empty()) {
            Some(email) => target.with_email(email),
            None => target,
        }
    }
}

/// Request to schedule an appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleVisitRequest {
    #[serde(flatten)]
    pub visitor: VisitorFields,
    #[serde(flatten)]
    pub target: TargetFields,
    pub scheduled_check_in_time: Timestamp,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Request to check in a walk-in visitor.
#[derive(Debug, Clone, Deserialize)]
pub struct WalkInRequest {
    #[serde(flatten)]
    pub visitor: VisitorFields,
    #[serde(flatten)]
    pub target: TargetFields,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Partial edit of visitor details. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVisitRequest {
    pub visitor_name: Option<String>,
    pub company_or_phone: Option<String>,
    pub card_number: Option<String>,
    pub contact_id: Option<String>,
    pub scheduled_check_in_time: Option<Timestamp>,
}

impl UpdateVisitRequest {
    pub fn into_patch(self) -> Result<VisitDetailsPatch, ValidationError> {
        Ok(VisitDetailsPatch {
            visitor_name: self.visitor_name,
            company_or_phone: self.company_or_phone,
            card_number: self.card_number,
            contact_id: self.contact_id.map(ContactId::new).transpose()?,
            scheduled_check_in_time: self.scheduled_check_in_time,
        })
    }
}

/// Request to forward a visitor to another department or staff member.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardVisitRequest {
    #[serde(flatten)]
    pub target: TargetFields,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Request to record a milestone on the current stop.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMilestoneRequest {
    pub action: String,
}

/// Request to edit one stop's purpose.
#[derive(Debug, Clone, Deserialize)]
pub struct EditPurposeRequest {
    pub purpose: String,
}

/// Query parameters of the reception log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceptionLogParams {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ReceptionLogParams {
    pub fn into_filter(self) -> Result<LogFilter, ValidationError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(label) => Some(VisitStatus::from_label(label).ok_or_else(|| {
                ValidationError::invalid_format("status", format!("unknown status '{}'", label))
            })?),
        };
        Ok(LogFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            status,
        })
    }
}

/// Query parameters of queue endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueParams {
    pub mode: Option<String>,
}

impl QueueParams {
    pub fn view_mode(&self) -> Result<ViewMode, ValidationError> {
        self.mode.as_deref().unwrap_or_default().parse()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One stop of a visit.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResponse {
    pub department: String,
    pub purpose: String,
    pub timestamp: Timestamp,
    pub action: Option<String>,
}

impl From<&VisitSegment> for SegmentResponse {
    fn from(segment: &VisitSegment) -> Self {
        Self {
            department: segment.department.clone(),
            purpose: segment.purpose.clone(),
            timestamp: segment.timestamp,
            action: segment.action.as_ref().map(|a| a.label().to_string()),
        }
    }
}

/// A visit as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct VisitResponse {
    pub id: String,
    pub visitor_name: String,
    pub company_or_phone: String,
    pub contact_id: Option<String>,
    pub status: &'static str,
    pub target: String,
    pub daily_sequence_number: Option<u32>,
    pub card_number: Option<String>,
    pub scheduled_check_in_time: Option<Timestamp>,
    pub check_in_time: Option<Timestamp>,
    pub check_out_time: Option<Timestamp>,
    pub called_at: Option<Timestamp>,
    pub staff_name: Option<String>,
    pub staff_email: Option<String>,
    pub created_at: Timestamp,
    pub segments: Vec<SegmentResponse>,
}

impl From<&Visit> for VisitResponse {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id().to_string(),
            visitor_name: visit.visitor_name().to_string(),
            company_or_phone: visit.company_or_phone().to_string(),
            contact_id: visit.contact_id().map(|c| c.to_string()),
            status: visit.status().label(),
            target: visit.target().to_string(),
            daily_sequence_number: visit.daily_sequence_number(),
            card_number: visit.card_number().map(str::to_string),
            scheduled_check_in_time: visit.scheduled_check_in_time().copied(),
            check_in_time: visit.check_in_time().copied(),
            check_out_time: visit.check_out_time().copied(),
            called_at: visit.called_at().copied(),
            staff_name: visit.staff_name().map(str::to_string),
            staff_email: visit.staff_email().map(str::to_string),
            created_at: *visit.created_at(),
            segments: visit.segments().iter().map(SegmentResponse::from).collect(),
        }
    }
}

impl From<Visit> for VisitResponse {
    fn from(visit: Visit) -> Self {
        Self::from(&visit)
    }
}

fn visits(list: &[Visit]) -> Vec<VisitResponse> {
    list.iter().map(VisitResponse::from).collect()
}

/// One stop with the time spent there.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyStopResponse {
    pub index: usize,
    pub department: String,
    pub purpose: String,
    pub action: Option<String>,
    pub started_at: Timestamp,
    pub time_spent_secs: Option<i64>,
}

impl From<&JourneyStop> for JourneyStopResponse {
    fn from(stop: &JourneyStop) -> Self {
        Self {
            index: stop.index,
            department: stop.department.clone(),
            purpose: stop.purpose.clone(),
            action: stop.action.as_ref().map(|a| a.label().to_string()),
            started_at: stop.started_at,
            time_spent_secs: stop.time_spent.map(|d| d.num_seconds()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyResponse {
    pub route: Vec<String>,
    pub stops: Vec<JourneyStopResponse>,
    pub total_secs: Option<i64>,
    pub is_open: bool,
}

impl From<&VisitJourney> for JourneyResponse {
    fn from(journey: &VisitJourney) -> Self {
        Self {
            route: journey.route().into_iter().map(str::to_string).collect(),
            stops: journey.stops.iter().map(JourneyStopResponse::from).collect(),
            total_secs: journey.total.map(|d| d.num_seconds()),
            is_open: journey.is_open,
        }
    }
}

/// A visit together with its journey.
#[derive(Debug, Clone, Serialize)]
pub struct VisitDetailResponse {
    pub visit: VisitResponse,
    pub journey: JourneyResponse,
}

impl From<VisitView> for VisitDetailResponse {
    fn from(view: VisitView) -> Self {
        Self {
            visit: VisitResponse::from(&view.visit),
            journey: JourneyResponse::from(&view.journey),
        }
    }
}

/// Result of an optimistic purpose edit.
#[derive(Debug, Clone, Serialize)]
pub struct EditPurposeResponse {
    pub visit: VisitResponse,
    pub edit_status: String,
    pub error: Option<String>,
}

impl EditPurposeResponse {
    pub fn new(visit: &Visit, status: Option<EditStatus>) -> Self {
        let (edit_status, error) = match status {
            Some(EditStatus::Pending) | None => ("pending", None),
            Some(EditStatus::Saving) => ("saving", None),
            Some(EditStatus::Saved) => ("saved", None),
            Some(EditStatus::Unsaved(reason)) => ("unsaved", Some(reason)),
        };
        Self {
            visit: VisitResponse::from(visit),
            edit_status: edit_status.to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueEntryResponse {
    pub position: usize,
    pub target: String,
    pub is_calling: bool,
    pub is_callable: bool,
    pub wait_minutes: Option<i64>,
    pub visit: VisitResponse,
}

impl From<&QueueEntry> for QueueEntryResponse {
    fn from(entry: &QueueEntry) -> Self {
        Self {
            position: entry.position,
            target: entry.target.clone(),
            is_calling: entry.is_calling,
            is_callable: entry.is_callable(),
            wait_minutes: entry.wait_minutes,
            visit: VisitResponse::from(&entry.visit),
        }
    }
}

/// A viewer's live queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueResponse {
    pub mode: ViewMode,
    pub generated_at: Timestamp,
    pub entries: Vec<QueueEntryResponse>,
}

impl From<QueueProjection> for QueueResponse {
    fn from(projection: QueueProjection) -> Self {
        Self {
            mode: projection.mode,
            generated_at: projection.generated_at,
            entries: projection.entries.iter().map(QueueEntryResponse::from).collect(),
        }
    }
}

/// Result of "call next". `called` is absent when every waiting visitor
/// still has to be checked in.
#[derive(Debug, Clone, Serialize)]
pub struct CallNextResponse {
    pub called: Option<VisitResponse>,
    pub awaiting_check_in: Vec<String>,
}

impl CallNextResponse {
    /// `None` when nobody is waiting at all.
    pub fn from_outcome(outcome: CallNextOutcome) -> Option<Self> {
        let ids = |ids: Vec<VisitId>| -> Vec<String> {
            ids.into_iter().map(|id| id.as_str().to_string()).collect()
        };
        match outcome {
            CallNextOutcome::Called { visit, passed_over } => Some(Self {
                called: Some(VisitResponse::from(visit)),
                awaiting_check_in: ids(passed_over),
            }),
            CallNextOutcome::AwaitingCheckIn(waiting) => Some(Self {
                called: None,
                awaiting_check_in: ids(waiting),
            }),
            CallNextOutcome::NoneWaiting => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceptionLogResponse {
    pub log: Vec<VisitResponse>,
    pub scheduled: Vec<VisitResponse>,
}

impl From<ReceptionLog> for ReceptionLogResponse {
    fn from(log: ReceptionLog) -> Self {
        Self {
            log: visits(&log.log),
            scheduled: visits(&log.scheduled),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceptionSummaryResponse {
    pub visitors_today: usize,
    pub currently_checked_in: usize,
    pub pending_appointments_today: usize,
}

impl From<ReceptionSummary> for ReceptionSummaryResponse {
    fn from(summary: ReceptionSummary) -> Self {
        Self {
            visitors_today: summary.visitors_today,
            currently_checked_in: summary.currently_checked_in,
            pending_appointments_today: summary.pending_appointments_today,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardRowResponse {
    pub visit_id: String,
    pub ticket: Option<u32>,
    pub visitor_name: String,
    pub waiting_for: String,
    pub purpose: String,
    pub wait_minutes: Option<i64>,
    pub is_calling: bool,
}

impl From<&BoardRow> for BoardRowResponse {
    fn from(row: &BoardRow) -> Self {
        Self {
            visit_id: row.visit_id.to_string(),
            ticket: row.ticket,
            visitor_name: row.visitor_name.clone(),
            waiting_for: row.waiting_for.clone(),
            purpose: row.purpose.clone(),
            wait_minutes: row.wait_minutes,
            is_calling: row.is_calling,
        }
    }
}

/// Waiting-room display.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayBoardResponse {
    pub generated_at: Timestamp,
    pub rows: Vec<BoardRowResponse>,
    pub now_calling: Vec<BoardRowResponse>,
}

impl From<DisplayBoard> for DisplayBoardResponse {
    fn from(board: DisplayBoard) -> Self {
        Self {
            generated_at: board.generated_at,
            rows: board.rows.iter().map(BoardRowResponse::from).collect(),
            now_calling: board.now_calling.iter().map(BoardRowResponse::from).collect(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}
