//! State machine trait for lifecycle status enums.
//!
//! Gives every status enum the same vocabulary for checking and performing
//! transitions, so aggregates never assign a status field directly.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal edges; validated transitions come for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for VisitStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Scheduled, CheckedIn) | (CheckedIn, CheckedOut))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Scheduled => vec![CheckedIn],
///             CheckedIn => vec![CheckedOut],
///             CheckedOut => vec![],
///         }
///     }
/// }
///
/// let next = visit.status().transition_to(VisitStatus::CheckedOut)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Returns true if `target` is reachable through one or more legal edges.
    fn can_reach(&self, target: &Self) -> bool {
        let mut frontier = self.valid_transitions();
        let mut seen: Vec<Self> = Vec::new();
        while let Some(next) = frontier.pop() {
            if &next == target {
                return true;
            }
            if !seen.contains(&next) {
                seen.push(next);
                frontier.extend(next.valid_transitions());
            }
        }
        false
    }
}
