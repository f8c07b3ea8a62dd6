//! VisitStatus enum for tracking a visitor's presence on premises.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Stored lifecycle status of a visit.
///
/// "Called" is deliberately absent: it is derived from `called_at` and a time
/// window, see [`super::Visit::is_calling`]. Older records that stored
/// `"Called"` as a status are read back as `CheckedIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitStatus {
    #[serde(rename = "Scheduled")]
    Scheduled,
    #[serde(rename = "Checked-in", alias = "Called", alias = "CheckedIn")]
    CheckedIn,
    #[serde(rename = "Checked-out", alias = "CheckedOut")]
    CheckedOut,
}

impl VisitStatus {
    /// Returns true while the visitor is on premises.
    pub fn is_on_premises(&self) -> bool {
        matches!(self, VisitStatus::CheckedIn)
    }

    /// Returns true if the visit still belongs in a live queue.
    pub fn is_open(&self) -> bool {
        !matches!(self, VisitStatus::CheckedOut)
    }

    /// Wire label, matching the serde representation.
    pub fn label(&self) -> &'static str {
        match self {
            VisitStatus::Scheduled => "Scheduled",
            VisitStatus::CheckedIn => "Checked-in",
            VisitStatus::CheckedOut => "Checked-out",
        }
    }

    /// Parses a wire label, accepting the legacy `"Called"` value.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Scheduled" => Some(VisitStatus::Scheduled),
            "Checked-in" | "CheckedIn" | "Called" => Some(VisitStatus::CheckedIn),
            "Checked-out" | "CheckedOut" => Some(VisitStatus::CheckedOut),
            _ => None,
        }
    }
}

impl StateMachine for VisitStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use VisitStatus::*;
        matches!((self, target), (Scheduled, CheckedIn) | (CheckedIn, CheckedOut))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use VisitStatus::*;
        match self {
            Scheduled => vec![CheckedIn],
            CheckedIn => vec![CheckedOut],
            CheckedOut => vec![],
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_edges_only_move_forward() {
        use VisitStatus::*;
        assert!(Scheduled.can_transition_to(&CheckedIn));
        assert!(CheckedIn.can_transition_to(&CheckedOut));
        assert!(!CheckedIn.can_transition_to(&Scheduled));
        assert!(!CheckedOut.can_transition_to(&CheckedIn));
        assert!(!Scheduled.can_transition_to(&CheckedOut));
    }

    #[test]
    fn checked_out_is_terminal() {
        assert!(VisitStatus::CheckedOut.is_terminal());
        assert!(!VisitStatus::Scheduled.is_terminal());
    }

    #[test]
    fn serializes_with_portal_labels() {
        assert_eq!(
            serde_json::to_string(&VisitStatus::CheckedIn).unwrap(),
            "\"Checked-in\""
        );
        assert_eq!(
            serde_json::to_string(&VisitStatus::CheckedOut).unwrap(),
            "\"Checked-out\""
        );
    }

    #[test]
    fn legacy_called_status_reads_as_checked_in() {
        let status: VisitStatus = serde_json::from_str("\"Called\"").unwrap();
        assert_eq!(status, VisitStatus::CheckedIn);
        assert_eq!(VisitStatus::from_label("Called"), Some(VisitStatus::CheckedIn));
    }

    #[test]
    fn only_checked_out_leaves_the_queue() {
        assert!(VisitStatus::Scheduled.is_open());
        assert!(VisitStatus::CheckedIn.is_open());
        assert!(!VisitStatus::CheckedOut.is_open());
        assert!(VisitStatus::CheckedIn.is_on_premises());
        assert!(!VisitStatus::Scheduled.is_on_premises());
    }
}
