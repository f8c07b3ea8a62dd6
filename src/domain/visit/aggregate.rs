//! Visit aggregate entity.
//!
//! A visit is one physical presence of a visitor on premises (or a scheduled
//! future presence). It moves through `Scheduled → CheckedIn → CheckedOut`
//! and accumulates one segment per department stop.
//!
//! Every operation takes the current instant explicitly so that callers
//! control time through the clock port.

use chrono::Duration;

use crate::domain::foundation::{
    ContactId, DomainError, ErrorCode, StateMachine, Timestamp, ValidationError, VisitId,
};

use super::{SegmentAction, VisitSegment, VisitStatus};

/// Maximum length for a visitor name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for a department or staff label.
pub const MAX_DEPARTMENT_LENGTH: usize = 200;

/// Maximum length for a segment purpose.
pub const MAX_PURPOSE_LENGTH: usize = 2000;

/// Placeholder stored when a walk-in gives no company or phone.
pub const UNKNOWN_COMPANY: &str = "N/A";

/// Who the visitor is. Shared by scheduling, walk-in and detail edits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisitorDetails {
    pub visitor_name: String,
    pub company_or_phone: Option<String>,
    pub contact_id: Option<ContactId>,
    pub card_number: Option<String>,
}

impl VisitorDetails {
    pub fn new(visitor_name: impl Into<String>) -> Self {
        Self {
            visitor_name: visitor_name.into(),
            ..Default::default()
        }
    }

    pub fn with_company_or_phone(mut self, value: impl Into<String>) -> Self {
        self.company_or_phone = Some(value.into());
        self
    }

    pub fn with_contact(mut self, contact_id: ContactId) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn with_card_number(mut self, card: impl Into<String>) -> Self {
        self.card_number = Some(card.into());
        self
    }
}

/// Target of a stop: a department label or staff name, plus an optional
/// email for the staff member behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub department: String,
    pub email: Option<String>,
}

impl HostTarget {
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Partial update of visitor details. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisitDetailsPatch {
    pub visitor_name: Option<String>,
    pub company_or_phone: Option<String>,
    pub card_number: Option<String>,
    pub contact_id: Option<ContactId>,
    pub scheduled_check_in_time: Option<Timestamp>,
}

impl VisitDetailsPatch {
    pub fn is_empty(&self) -> bool {
        self.visitor_name.is_none()
            && self.company_or_phone.is_none()
            && self.card_number.is_none()
            && self.contact_id.is_none()
            && self.scheduled_check_in_time.is_none()
    }
}

/// Visit aggregate.
///
/// # Invariants
///
/// - `segments` is never empty
/// - `status` only moves forward along `Scheduled → CheckedIn → CheckedOut`
/// - `daily_sequence_number` is assigned at most once
/// - `check_out_time` is never cleared once set
/// - `primary_host` and `staff_name` mirror the last segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    id: VisitId,
    visitor_name: String,
    contact_id: Option<ContactId>,
    company_or_phone: String,
    status: VisitStatus,
    check_in_time: Option<Timestamp>,
    check_out_time: Option<Timestamp>,
    scheduled_check_in_time: Option<Timestamp>,
    called_at: Option<Timestamp>,
    daily_sequence_number: Option<u32>,
    card_number: Option<String>,
    segments: Vec<VisitSegment>,
    primary_host: String,
    staff_name: Option<String>,
    staff_email: Option<String>,
    created_at: Timestamp,
}

impl Visit {
    /// Schedule a future visit.
    ///
    /// The single segment is stamped with the scheduling time; it is
    /// re-stamped on arrival.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the visitor name or department is blank or too long
    pub fn schedule(
        id: VisitId,
        details: VisitorDetails,
        target: HostTarget,
        scheduled_check_in_time: Timestamp,
        purpose: Option<String>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let mut visit = Self::build(id, details, target, purpose, now)?;
        visit.scheduled_check_in_time = Some(scheduled_check_in_time);
        Ok(visit)
    }

    /// Register a visitor who arrived without an appointment.
    ///
    /// The visit starts `CheckedIn` and carries its daily sequence number.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the visitor name or department is blank or too long
    pub fn walk_in(
        id: VisitId,
        details: VisitorDetails,
        target: HostTarget,
        purpose: Option<String>,
        daily_sequence_number: u32,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let mut visit = Self::build(id, details, target, purpose, now)?;
        visit.status = VisitStatus::CheckedIn;
        visit.check_in_time = Some(now);
        visit.daily_sequence_number = Some(daily_sequence_number);
        Ok(visit)
    }

    /// Runs the checks `schedule` and `walk_in` apply, without building a visit.
    ///
    /// Lets callers reject bad input before touching the store.
    pub fn validate_new(
        details: &VisitorDetails,
        target: &HostTarget,
        purpose: Option<&str>,
    ) -> Result<(), DomainError> {
        Self::validate_name(&details.visitor_name)?;
        Self::validate_department(&target.department)?;
        Self::validate_purpose(purpose.map(str::trim).unwrap_or_default())
    }

    fn build(
        id: VisitId,
        details: VisitorDetails,
        target: HostTarget,
        purpose: Option<String>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let visitor_name = Self::validate_name(&details.visitor_name)?;
        let department = Self::validate_department(&target.department)?;
        let purpose = purpose.map(|p| p.trim().to_string()).unwrap_or_default();
        Self::validate_purpose(&purpose)?;

        let company_or_phone = details
            .company_or_phone
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

        Ok(Self {
            id,
            visitor_name,
            contact_id: details.contact_id,
            company_or_phone,
            status: VisitStatus::Scheduled,
            check_in_time: None,
            check_out_time: None,
            scheduled_check_in_time: None,
            called_at: None,
            daily_sequence_number: None,
            card_number: normalize_optional(details.card_number),
            primary_host: department.clone(),
            staff_name: Some(department.clone()),
            staff_email: target.email,
            segments: vec![VisitSegment::new(department, purpose, now)],
            created_at: now,
        })
    }

    /// Rebuild a visit from already validated parts. Used by `VisitRecord`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn reconstitute(
        id: VisitId,
        visitor_name: String,
        contact_id: Option<ContactId>,
        company_or_phone: String,
        status: VisitStatus,
        check_in_time: Option<Timestamp>,
        check_out_time: Option<Timestamp>,
        scheduled_check_in_time: Option<Timestamp>,
        called_at: Option<Timestamp>,
        daily_sequence_number: Option<u32>,
        card_number: Option<String>,
        segments: Vec<VisitSegment>,
        staff_email: Option<String>,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let last = segments
            .last()
            .ok_or_else(|| DomainError::validation("segments", "A visit needs at least one segment"))?;
        let primary_host = last.department.clone();

        Ok(Self {
            id,
            visitor_name,
            contact_id,
            company_or_phone,
            status,
            check_in_time,
            check_out_time,
            scheduled_check_in_time,
            called_at,
            daily_sequence_number,
            card_number,
            staff_name: Some(primary_host.clone()),
            primary_host,
            segments,
            staff_email,
            created_at,
        })
    }

    /// Returns the same visit under an identifier assigned by the store.
    pub fn with_id(mut self, id: VisitId) -> Self {
        self.id = id;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &VisitId {
        &self.id
    }

    pub fn visitor_name(&self) -> &str {
        &self.visitor_name
    }

    pub fn contact_id(&self) -> Option<&ContactId> {
        self.contact_id.as_ref()
    }

    pub fn company_or_phone(&self) -> &str {
        &self.company_or_phone
    }

    pub fn status(&self) -> VisitStatus {
        self.status
    }

    pub fn check_in_time(&self) -> Option<&Timestamp> {
        self.check_in_time.as_ref()
    }

    pub fn check_out_time(&self) -> Option<&Timestamp> {
        self.check_out_time.as_ref()
    }

    pub fn scheduled_check_in_time(&self) -> Option<&Timestamp> {
        self.scheduled_check_in_time.as_ref()
    }

    pub fn called_at(&self) -> Option<&Timestamp> {
        self.called_at.as_ref()
    }

    pub fn daily_sequence_number(&self) -> Option<u32> {
        self.daily_sequence_number
    }

    pub fn card_number(&self) -> Option<&str> {
        self.card_number.as_deref()
    }

    /// Returns the journey so far, oldest stop first.
    pub fn segments(&self) -> &[VisitSegment] {
        &self.segments
    }

    /// Returns the current stop.
    pub fn last_segment(&self) -> &VisitSegment {
        // `segments` is non-empty by construction.
        &self.segments[self.segments.len() - 1]
    }

    /// Department or staff label the visitor is currently queued for.
    pub fn target(&self) -> &str {
        &self.last_segment().department
    }

    pub fn primary_host(&self) -> &str {
        &self.primary_host
    }

    pub fn staff_name(&self) -> Option<&str> {
        self.staff_name.as_deref()
    }

    pub fn staff_email(&self) -> Option<&str> {
        self.staff_email.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Arrival time if checked in, otherwise the appointment time.
    pub fn queue_time(&self) -> Option<&Timestamp> {
        self.check_in_time
            .as_ref()
            .or(self.scheduled_check_in_time.as_ref())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived state
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns true while a call is active.
    ///
    /// A call is active for `window` after `called_at`. Once the window
    /// elapses the visitor is actionable again without any state change.
    pub fn is_calling(&self, now: &Timestamp, window: Duration) -> bool {
        match &self.called_at {
            Some(called_at) if self.status == VisitStatus::CheckedIn => {
                now.duration_since(called_at) < window
            }
            _ => false,
        }
    }

    /// Time on premises: until check-out, or until `now` while still open.
    ///
    /// `None` for visits that never checked in.
    pub fn duration(&self, now: &Timestamp) -> Option<Duration> {
        let start = self.check_in_time.as_ref()?;
        let end = self.check_out_time.as_ref().unwrap_or(now);
        Some(end.duration_since(start))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the arrival of a scheduled visitor.
    ///
    /// The first segment is re-stamped to the arrival time. A sequence number
    /// that is already present is kept.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the visit is `Scheduled`
    pub fn check_in(&mut self, daily_sequence_number: u32, now: Timestamp) -> Result<(), DomainError> {
        self.transition(VisitStatus::CheckedIn)?;
        self.check_in_time = Some(now);
        if self.daily_sequence_number.is_none() {
            self.daily_sequence_number = Some(daily_sequence_number);
        }
        self.segments[0].timestamp = now;
        Ok(())
    }

    /// Record the visitor leaving the premises.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the visit is `CheckedIn`
    pub fn check_out(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(VisitStatus::CheckedOut)?;
        self.check_out_time = Some(now);
        Ok(())
    }

    /// Call the visitor to the current stop. Calling again refreshes the call.
    ///
    /// # Errors
    ///
    /// - `VisitCheckedOut` if the visit has ended
    /// - `InvalidStateTransition` if the visitor has not arrived
    pub fn call(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_on_premises("call")?;
        self.called_at = Some(now);
        self.last_segment_mut().action = Some(SegmentAction::Called);
        Ok(())
    }

    /// Send the visitor on to another department or staff member.
    ///
    /// Appends one segment and moves queue ownership to `target`. An empty
    /// purpose defaults to a follow-up note naming `forwarded_by`. Any
    /// active call is cleared so the new target sees an actionable visitor.
    ///
    /// # Errors
    ///
    /// - `VisitCheckedOut` if the visit has ended
    /// - `InvalidStateTransition` if the visitor has not arrived
    /// - `ValidationFailed` if the target is blank or a field is too long
    pub fn forward(
        &mut self,
        target: HostTarget,
        purpose: Option<String>,
        forwarded_by: &str,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.ensure_on_premises("forward")?;
        let department = Self::validate_department(&target.department)?;
        let purpose = purpose
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| format!("Follow up from {}", forwarded_by));
        Self::validate_purpose(&purpose)?;

        self.segments.push(VisitSegment::new(department, purpose, now));
        self.called_at = None;
        self.staff_email = target.email;
        self.mirror_last_segment();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the purpose of one segment.
    ///
    /// # Errors
    ///
    /// - `SegmentNotFound` if `index` is out of range
    /// - `TooLong` if the purpose exceeds the limit
    pub fn set_segment_purpose(&mut self, index: usize, purpose: impl Into<String>) -> Result<(), DomainError> {
        let purpose = purpose.into();
        Self::validate_purpose(&purpose)?;
        let segment = self.segment_mut(index)?;
        segment.purpose = purpose;
        Ok(())
    }

    /// Record a milestone on the current stop.
    ///
    /// # Errors
    ///
    /// - `VisitCheckedOut` if the visit has ended
    /// - `InvalidStateTransition` if the visitor has not arrived
    pub fn record_milestone(&mut self, action: SegmentAction) -> Result<(), DomainError> {
        self.ensure_on_premises("record a milestone for")?;
        self.last_segment_mut().action = Some(action);
        Ok(())
    }

    /// Apply a partial update of visitor details.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the new visitor name is blank or too long
    pub fn update_details(&mut self, patch: VisitDetailsPatch) -> Result<(), DomainError> {
        if patch.scheduled_check_in_time.is_some() && self.status != VisitStatus::Scheduled {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Only scheduled visits can be rescheduled",
            ));
        }
        let visitor_name = patch
            .visitor_name
            .as_deref()
            .map(Self::validate_name)
            .transpose()?;

        if let Some(name) = visitor_name {
            self.visitor_name = name;
        }
        if let Some(company) = patch.company_or_phone {
            let company = company.trim();
            self.company_or_phone = if company.is_empty() {
                UNKNOWN_COMPANY.to_string()
            } else {
                company.to_string()
            };
        }
        if let Some(card) = patch.card_number {
            self.card_number = normalize_optional(Some(card));
        }
        if let Some(contact_id) = patch.contact_id {
            self.contact_id = Some(contact_id);
        }
        if let Some(scheduled) = patch.scheduled_check_in_time {
            self.scheduled_check_in_time = Some(scheduled);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn transition(&mut self, target: VisitStatus) -> Result<(), DomainError> {
        let next = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move visit from {} to {}", self.status, target),
            )
            .with_detail("visit_id", self.id.as_str())
        })?;
        self.status = next;
        Ok(())
    }

    fn ensure_on_premises(&self, operation: &str) -> Result<(), DomainError> {
        match self.status {
            VisitStatus::CheckedIn => Ok(()),
            VisitStatus::CheckedOut => Err(DomainError::new(
                ErrorCode::VisitCheckedOut,
                format!("Cannot {} a visitor who has checked out", operation),
            )
            .with_detail("visit_id", self.id.as_str())),
            VisitStatus::Scheduled => Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot {} a visitor who has not checked in", operation),
            )
            .with_detail("visit_id", self.id.as_str())),
        }
    }

    fn mirror_last_segment(&mut self) {
        let department = self.last_segment().department.clone();
        self.staff_name = Some(department.clone());
        self.primary_host = department;
    }

    fn last_segment_mut(&mut self) -> &mut VisitSegment {
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    fn segment_mut(&mut self, index: usize) -> Result<&mut VisitSegment, DomainError> {
        let count = self.segments.len();
        let id = self.id.clone();
        self.segments.get_mut(index).ok_or_else(|| {
            DomainError::new(
                ErrorCode::SegmentNotFound,
                format!("Segment {} does not exist (visit has {})", index, count),
            )
            .with_detail("visit_id", id.as_str())
        })
    }

    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("visitor_name", "Visitor name is required"));
        }
        let length = trimmed.chars().count();
        if length > MAX_NAME_LENGTH {
            return Err(ValidationError::too_long("visitor_name", MAX_NAME_LENGTH, length).into());
        }
        Ok(trimmed.to_string())
    }

    fn validate_department(department: &str) -> Result<String, DomainError> {
        let trimmed = department.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("department", "Target department is required"));
        }
        let length = trimmed.chars().count();
        if length > MAX_DEPARTMENT_LENGTH {
            return Err(ValidationError::too_long("department", MAX_DEPARTMENT_LENGTH, length).into());
        }
        Ok(trimmed.to_string())
    }

    fn validate_purpose(purpose: &str) -> Result<(), DomainError> {
        let length = purpose.chars().count();
        if length > MAX_PURPOSE_LENGTH {
            return Err(ValidationError::too_long("purpose", MAX_PURPOSE_LENGTH, length).into());
        }
        Ok(())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::parse("2024-05-01T04:30:00Z").unwrap().plus_secs(secs)
    }

    fn scheduled() -> Visit {
        Visit::schedule(
            VisitId::new("v-1").unwrap(),
            VisitorDetails::new("Asha").with_company_or_phone("98450 00000"),
            HostTarget::new("Admissions"),
            at(3600),
            Some("Course enquiry".to_string()),
            at(0),
        )
        .unwrap()
    }

    fn walk_in() -> Visit {
        Visit::walk_in(
            VisitId::new("v-2").unwrap(),
            VisitorDetails::new("Ravi"),
            HostTarget::new("Admissions"),
            None,
            4,
            at(100),
        )
        .unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn schedule_creates_single_segment_in_scheduled_state() {
            let visit = scheduled();
            assert_eq!(visit.status(), VisitStatus::Scheduled);
            assert_eq!(visit.segments().len(), 1);
            assert_eq!(visit.segments()[0].department, "Admissions");
            assert_eq!(visit.segments()[0].timestamp, at(0));
            assert_eq!(visit.scheduled_check_in_time(), Some(&at(3600)));
            assert_eq!(visit.daily_sequence_number(), None);
        }

        #[test]
        fn schedule_rejects_blank_visitor_name() {
            let err = Visit::schedule(
                VisitId::generate(),
                VisitorDetails::new("   "),
                HostTarget::new("Admissions"),
                at(10),
                None,
                at(0),
            )
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
            assert_eq!(err.detail("field"), Some("visitor_name"));
        }

        #[test]
        fn schedule_rejects_blank_department() {
            let err = Visit::schedule(
                VisitId::generate(),
                VisitorDetails::new("Asha"),
                HostTarget::new(""),
                at(10),
                None,
                at(0),
            )
            .unwrap_err();
            assert_eq!(err.detail("field"), Some("department"));
        }

        #[test]
        fn walk_in_is_checked_in_with_sequence_number() {
            let visit = walk_in();
            assert_eq!(visit.status(), VisitStatus::CheckedIn);
            assert_eq!(visit.check_in_time(), Some(&at(100)));
            assert_eq!(visit.daily_sequence_number(), Some(4));
            assert_eq!(visit.segments()[0].timestamp, at(100));
        }

        #[test]
        fn walk_in_without_company_uses_placeholder() {
            assert_eq!(walk_in().company_or_phone(), UNKNOWN_COMPANY);
        }

        #[test]
        fn host_fields_mirror_first_segment() {
            let visit = scheduled();
            assert_eq!(visit.primary_host(), "Admissions");
            assert_eq!(visit.staff_name(), Some("Admissions"));
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn check_in_restamps_first_segment_and_assigns_number() {
            let mut visit = scheduled();
            visit.check_in(3, at(500)).unwrap();

            assert_eq!(visit.status(), VisitStatus::CheckedIn);
            assert_eq!(visit.check_in_time(), Some(&at(500)));
            assert_eq!(visit.daily_sequence_number(), Some(3));
            assert_eq!(visit.segments()[0].timestamp, at(500));
        }

        #[test]
        fn check_in_twice_is_rejected() {
            let mut visit = scheduled();
            visit.check_in(1, at(500)).unwrap();
            let err = visit.check_in(2, at(600)).unwrap_err();

            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
            assert_eq!(visit.daily_sequence_number(), Some(1));
        }

        #[test]
        fn check_out_requires_checked_in() {
            let mut visit = scheduled();
            let err = visit.check_out(at(10)).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
            assert!(visit.check_out_time().is_none());
        }

        #[test]
        fn check_out_sets_terminal_state() {
            let mut visit = walk_in();
            visit.check_out(at(900)).unwrap();
            assert_eq!(visit.status(), VisitStatus::CheckedOut);
            assert_eq!(visit.check_out_time(), Some(&at(900)));
            assert!(visit.check_out(at(950)).is_err());
            assert_eq!(visit.check_out_time(), Some(&at(900)));
        }

        #[test]
        fn duration_runs_until_checkout() {
            let mut visit = walk_in();
            assert_eq!(visit.duration(&at(400)), Some(Duration::seconds(300)));
            visit.check_out(at(700)).unwrap();
            assert_eq!(visit.duration(&at(5000)), Some(Duration::seconds(600)));
        }

        #[test]
        fn scheduled_visit_has_no_duration() {
            assert!(scheduled().duration(&at(10)).is_none());
        }
    }

    mod calling {
        use super::*;

        #[test]
        fn call_marks_last_segment_and_starts_window() {
            let mut visit = walk_in();
            visit.call(at(200)).unwrap();

            assert_eq!(visit.called_at(), Some(&at(200)));
            assert_eq!(visit.last_segment().action, Some(SegmentAction::Called));
            assert!(visit.is_calling(&at(230), Duration::seconds(60)));
            assert!(!visit.is_calling(&at(261), Duration::seconds(60)));
        }

        #[test]
        fn calling_again_refreshes_window() {
            let mut visit = walk_in();
            visit.call(at(200)).unwrap();
            visit.call(at(250)).unwrap();
            assert!(visit.is_calling(&at(300), Duration::seconds(60)));
        }

        #[test]
        fn call_requires_arrival() {
            let mut visit = scheduled();
            let err = visit.call(at(10)).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
            assert!(visit.called_at().is_none());
        }

        #[test]
        fn checked_out_visit_cannot_be_called() {
            let mut visit = walk_in();
            visit.check_out(at(300)).unwrap();
            let err = visit.call(at(310)).unwrap_err();
            assert_eq!(err.code, ErrorCode::VisitCheckedOut);
        }
    }

    mod forwarding {
        use super::*;

        #[test]
        fn forward_appends_exactly_one_segment() {
            let mut visit = walk_in();
            let number = visit.daily_sequence_number();
            visit
                .forward(HostTarget::new("Finance"), Some("Fee plan".into()), "Meera", at(300))
                .unwrap();

            assert_eq!(visit.segments().len(), 2);
            assert_eq!(visit.status(), VisitStatus::CheckedIn);
            assert_eq!(visit.target(), "Finance");
            assert_eq!(visit.primary_host(), "Finance");
            assert_eq!(visit.staff_name(), Some("Finance"));
            assert_eq!(visit.last_segment().timestamp, at(300));
            assert_eq!(visit.daily_sequence_number(), number);
        }

        #[test]
        fn forward_defaults_purpose_to_follow_up_note() {
            let mut visit = walk_in();
            visit
                .forward(HostTarget::new("Visa"), Some("  ".into()), "Meera", at(300))
                .unwrap();
            assert_eq!(visit.last_segment().purpose, "Follow up from Meera");
        }

        #[test]
        fn forward_clears_active_call() {
            let mut visit = walk_in();
            visit.call(at(200)).unwrap();
            visit.forward(HostTarget::new("Visa"), None, "Meera", at(210)).unwrap();

            assert!(visit.called_at().is_none());
            assert!(!visit.is_calling(&at(211), Duration::seconds(60)));
        }

        #[test]
        fn forward_rejects_checked_out_visit() {
            let mut visit = walk_in();
            visit.check_out(at(300)).unwrap();
            let err = visit
                .forward(HostTarget::new("Finance"), None, "Meera", at(310))
                .unwrap_err();

            assert_eq!(err.code, ErrorCode::VisitCheckedOut);
            assert_eq!(visit.segments().len(), 1);
        }

        #[test]
        fn forward_rejects_scheduled_visit() {
            let mut visit = scheduled();
            assert!(visit.forward(HostTarget::new("Finance"), None, "Meera", at(5)).is_err());
        }

        #[test]
        fn forward_carries_target_email() {
            let mut visit = walk_in();
            visit
                .forward(HostTarget::new("Finance").with_email("fin@example.com"), None, "M", at(5))
                .unwrap();
            assert_eq!(visit.staff_email(), Some("fin@example.com"));
        }
    }

    mod edits {
        use super::*;

        #[test]
        fn set_segment_purpose_targets_one_segment() {
            let mut visit = walk_in();
            visit.forward(HostTarget::new("Finance"), None, "M", at(300)).unwrap();
            visit.set_segment_purpose(0, "Updated").unwrap();

            assert_eq!(visit.segments()[0].purpose, "Updated");
            assert_eq!(visit.segments()[1].purpose, "Follow up from M");
        }

        #[test]
        fn set_segment_purpose_out_of_range_fails() {
            let mut visit = walk_in();
            let err = visit.set_segment_purpose(3, "x").unwrap_err();
            assert_eq!(err.code, ErrorCode::SegmentNotFound);
        }

        #[test]
        fn overlong_purpose_is_rejected_unchanged() {
            let mut visit = walk_in();
            let before = visit.segments()[0].purpose.clone();
            let err = visit
                .set_segment_purpose(0, "x".repeat(MAX_PURPOSE_LENGTH + 1))
                .unwrap_err();

            assert_eq!(err.code, ErrorCode::TooLong);
            assert_eq!(err.detail("field"), Some("purpose"));
            assert_eq!(visit.segments()[0].purpose, before);
        }

        #[test]
        fn record_milestone_sets_last_action() {
            let mut visit = walk_in();
            visit.record_milestone(SegmentAction::Ds160Started).unwrap();
            assert_eq!(visit.last_segment().action, Some(SegmentAction::Ds160Started));
        }

        #[test]
        fn update_details_applies_only_given_fields() {
            let mut visit = scheduled();
            visit
                .update_details(VisitDetailsPatch {
                    card_number: Some("B-12".into()),
                    ..Default::default()
                })
                .unwrap();

            assert_eq!(visit.card_number(), Some("B-12"));
            assert_eq!(visit.visitor_name(), "Asha");
            assert_eq!(visit.company_or_phone(), "98450 00000");
        }

        #[test]
        fn reschedule_only_allowed_before_arrival() {
            let mut visit = walk_in();
            let err = visit
                .update_details(VisitDetailsPatch {
                    scheduled_check_in_time: Some(at(9000)),
                    ..Default::default()
                })
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }

        #[test]
        fn update_details_rejects_blank_name() {
            let mut visit = scheduled();
            let patch = VisitDetailsPatch {
                visitor_name: Some(" ".into()),
                ..Default::default()
            };
            assert!(visit.update_details(patch).is_err());
            assert_eq!(visit.visitor_name(), "Asha");
        }
    }
}
