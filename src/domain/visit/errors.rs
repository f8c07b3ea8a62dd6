//! Visit-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, VisitId};

/// Errors surfaced by visit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitError {
    /// Visit was not found.
    NotFound(VisitId),
    /// The actor may not perform this operation.
    Forbidden { operation: String },
    /// The visit's status does not allow the operation.
    InvalidTransition(String),
    /// Input failed validation.
    ValidationFailed { field: String, message: String },
    /// The visit store could not be reached or rejected the call.
    Transport(String),
}

impl VisitError {
    pub fn not_found(id: VisitId) -> Self {
        VisitError::NotFound(id)
    }
    pub fn forbidden(operation: impl Into<String>) -> Self {
        VisitError::Forbidden {
            operation: operation.into(),
        }
    }
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        VisitError::InvalidTransition(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VisitError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn transport(message: impl Into<String>) -> Self {
        VisitError::Transport(message.into())
    }

    /// Returns true if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VisitError::Transport(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            VisitError::NotFound(_) => ErrorCode::VisitNotFound,
            VisitError::Forbidden { .. } => ErrorCode::Forbidden,
            VisitError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            VisitError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            VisitError::Transport(_) => ErrorCode::StoreUnavailable,
        }
    }
    pub fn message(&self) -> String {
        match self {
            VisitError::NotFound(id) => format!("Visit not found: {}", id),
            VisitError::Forbidden { operation } => {
                format!("Permission denied: cannot {}", operation)
            }
            VisitError::InvalidTransition(msg) => format!("Invalid transition: {}", msg),
            VisitError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            VisitError::Transport(msg) => format!("Visit store unavailable: {}", msg),
        }
    }
}

impl std::fmt::Display for VisitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for VisitError {}

impl From<DomainError> for VisitError {
    fn from(err: DomainError) -> Self {
        let field = err.detail("field").unwrap_or("unknown").to_string();
        match err.code {
            ErrorCode::VisitNotFound => match err.detail("visit_id").map(VisitId::new) {
                Some(Ok(id)) => VisitError::NotFound(id),
                _ => VisitError::Transport(err.message),
            },
            ErrorCode::Forbidden | ErrorCode::Unauthorized => VisitError::Forbidden {
                operation: err.message,
            },
            ErrorCode::InvalidStateTransition | ErrorCode::VisitCheckedOut => {
                VisitError::InvalidTransition(err.message)
            }
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::TooLong
            | ErrorCode::InvalidFormat => VisitError::ValidationFailed {
                field,
                message: err.message,
            },
            ErrorCode::SegmentNotFound => VisitError::ValidationFailed {
                field: "segment_index".to_string(),
                message: err.message,
            },
            ErrorCode::StoreUnavailable | ErrorCode::DatabaseError | ErrorCode::InternalError => {
                VisitError::Transport(err.message)
            }
        }
    }
}
