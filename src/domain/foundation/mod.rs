//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait, and error
//! types that form the vocabulary of the front desk domain.

mod actor;
mod command;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use actor::{Actor, ReceptionPermissions, StaffRole};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ContactId, StaffId, VisitId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
