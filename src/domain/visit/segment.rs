//! Visit segments: one stop in a visitor's journey.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Milestone reached at a stop.
///
/// Purely informational; the lifecycle never reads it. Labels outside the
/// known set are kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SegmentAction {
    Called,
    Counselling,
    Ds160Started,
    DocumentsCollected,
    ApplicationSubmitted,
    Other(String),
}

impl SegmentAction {
    pub fn label(&self) -> &str {
        match self {
            SegmentAction::Called => "Called",
            SegmentAction::Counselling => "Counselling",
            SegmentAction::Ds160Started => "DS-160 Started",
            SegmentAction::DocumentsCollected => "Documents Collected",
            SegmentAction::ApplicationSubmitted => "Application Submitted",
            SegmentAction::Other(label) => label,
        }
    }

    /// Parses a label, trimming whitespace. Returns `None` for blank input.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self::from(trimmed.to_string()))
    }
}

impl From<String> for SegmentAction {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Called" => SegmentAction::Called,
            "Counselling" => SegmentAction::Counselling,
            "DS-160 Started" => SegmentAction::Ds160Started,
            "Documents Collected" => SegmentAction::DocumentsCollected,
            "Application Submitted" => SegmentAction::ApplicationSubmitted,
            _ => SegmentAction::Other(label),
        }
    }
}

impl From<SegmentAction> for String {
    fn from(action: SegmentAction) -> Self {
        match action {
            SegmentAction::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for SegmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One stop within a visit: a department or staff target, a purpose, a start
/// time, and an optional milestone.
///
/// `department` holds either a department label or a staff member's name;
/// queue matching treats the two interchangeably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSegment {
    pub department: String,
    pub purpose: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<SegmentAction>,
}

impl VisitSegment {
    pub fn new(department: impl Into<String>, purpose: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            department: department.into(),
            purpose: purpose.into(),
            timestamp,
            action: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_round_trip_through_strings() {
        let action = SegmentAction::from("DS-160 Started".to_string());
        assert_eq!(action, SegmentAction::Ds160Started);
        assert_eq!(String::from(action), "DS-160 Started");
    }

    #[test]
    fn unknown_labels_are_preserved() {
        let action = SegmentAction::from("Visa Interview Prep".to_string());
        assert_eq!(action, SegmentAction::Other("Visa Interview Prep".to_string()));
        assert_eq!(action.label(), "Visa Interview Prep");
    }

    #[test]
    fn parse_rejects_blank_labels() {
        assert_eq!(SegmentAction::parse("   "), None);
        assert_eq!(SegmentAction::parse(" Called "), Some(SegmentAction::Called));
    }

    #[test]
    fn segment_serializes_action_as_plain_label() {
        let mut segment = VisitSegment::new("Admissions", "Enquiry", Timestamp::now());
        segment.action = Some(SegmentAction::Counselling);

        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["action"], "Counselling");
        assert_eq!(json["department"], "Admissions");
    }

    #[test]
    fn segment_without_action_omits_field() {
        let segment = VisitSegment::new("Finance", "Fees", Timestamp::now());
        let json = serde_json::to_value(&segment).unwrap();
        assert!(json.get("action").is_none());
    }
}
