//! Plain data shape of a visit as stored and transported.
//!
//! Field names follow the portal's JSON (`camelCase`, `host` for the current
//! department, `company` for company or phone). Records written before
//! segments existed carry only `host`/`purpose`; they are upgraded to a
//! single-segment journey when read.

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::foundation::{ContactId, DomainError, Timestamp, ValidationError, VisitId};

use super::{SegmentAction, Visit, VisitSegment, VisitStatus, UNKNOWN_COMPANY};

/// Wire form of a [`VisitSegment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    pub department: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Wire form of a [`Visit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub host: String,
    pub status: VisitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub called_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_sequence_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub visit_segments: Vec<SegmentRecord>,
}

impl Visit {
    /// Validate a record and build the aggregate from it.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the id or name is blank, a timestamp does not
    ///   parse, or neither segments nor a `host` are present
    pub fn from_record(record: VisitRecord) -> Result<Self, DomainError> {
        let id = VisitId::new(record.id)?;
        let visitor_name = record.name.trim().to_string();
        if visitor_name.is_empty() {
            return Err(DomainError::validation("name", "Visitor name is required"));
        }

        let scheduled = parse_optional(record.scheduled_check_in.as_deref(), "scheduledCheckIn")?;
        let check_in = parse_optional(record.check_in.as_deref(), "checkIn")?;
        let check_out = parse_optional(record.check_out.as_deref(), "checkOut")?;
        let called_at = parse_optional(record.called_at.as_deref(), "calledAt")?;
        let created_at = parse_optional(record.created_at.as_deref(), "createdAt")?;

        // Anchor for stops that carry no timestamp of their own.
        let anchor = check_in
            .or(scheduled)
            .or(created_at)
            .ok_or_else(|| DomainError::validation("timestamp", "Record carries no timestamps"))?;

        let segments = if record.visit_segments.is_empty() {
            if record.host.trim().is_empty() {
                return Err(DomainError::validation("host", "Record has no department"));
            }
            vec![VisitSegment::new(
                record.host.trim(),
                record.purpose.unwrap_or_default(),
                anchor,
            )]
        } else {
            record
                .visit_segments
                .into_iter()
                .map(|segment| {
                    let timestamp = parse_optional(segment.timestamp.as_deref(), "timestamp")?
                        .unwrap_or(anchor);
                    Ok(VisitSegment {
                        department: segment.department,
                        purpose: segment.purpose,
                        timestamp,
                        action: segment.action.as_deref().and_then(SegmentAction::parse),
                    })
                })
                .collect::<Result<Vec<_>, DomainError>>()?
        };

        let contact_id = record
            .contact_id
            .filter(|c| !c.trim().is_empty())
            .map(ContactId::new)
            .transpose()?;

        let company = if record.company.trim().is_empty() {
            UNKNOWN_COMPANY.to_string()
        } else {
            record.company
        };

        Visit::reconstitute(
            id,
            visitor_name,
            contact_id,
            company,
            record.status,
            check_in,
            check_out,
            scheduled,
            called_at,
            record.daily_sequence_number,
            record.card_number.filter(|c| !c.trim().is_empty()),
            segments,
            record.staff_email.filter(|e| !e.trim().is_empty()),
            created_at.unwrap_or(anchor),
        )
    }

    /// Flatten the aggregate into its wire form.
    pub fn to_record(&self) -> VisitRecord {
        VisitRecord {
            id: self.id().to_string(),
            name: self.visitor_name().to_string(),
            company: self.company_or_phone().to_string(),
            host: self.primary_host().to_string(),
            status: self.status(),
            scheduled_check_in: self.scheduled_check_in_time().map(Timestamp::to_rfc3339),
            check_in: self.check_in_time().map(Timestamp::to_rfc3339),
            check_out: self.check_out_time().map(Timestamp::to_rfc3339),
            called_at: self.called_at().map(Timestamp::to_rfc3339),
            card_number: self.card_number().map(str::to_string),
            purpose: Some(self.last_segment().purpose.clone()),
            contact_id: self.contact_id().map(|c| c.to_string()),
            daily_sequence_number: self.daily_sequence_number(),
            staff_email: self.staff_email().map(str::to_string),
            staff_name: self.staff_name().map(str::to_string),
            created_at: Some(self.created_at().to_rfc3339()),
            visit_segments: self
                .segments()
                .iter()
                .map(|segment| SegmentRecord {
                    department: segment.department.clone(),
                    purpose: segment.purpose.clone(),
                    action: segment.action.as_ref().map(|a| a.label().to_string()),
                    timestamp: Some(segment.timestamp.to_rfc3339()),
                })
                .collect(),
        }
    }
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 with any offset, and zone-less `YYYY-MM-DD[T ]HH:MM:SS[.fff]`
/// values, which are read as UTC. Blank strings mean "not set".
pub fn parse_stored_timestamp(value: &str) -> Result<Option<Timestamp>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = Timestamp::parse(trimmed) {
        return Ok(Some(ts));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Some(Timestamp::from_datetime(Utc.from_utc_datetime(&naive))));
        }
    }
    Err(ValidationError::invalid_format(
        "timestamp",
        format!("unrecognised timestamp '{}'", trimmed),
    ))
}

fn parse_optional(value: Option<&str>, field: &str) -> Result<Option<Timestamp>, DomainError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_stored_timestamp(raw)
            .map_err(|e| DomainError::validation(field, e.to_string())),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
