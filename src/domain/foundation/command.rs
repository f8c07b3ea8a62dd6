//! Command infrastructure for CQRS handlers.
//!
//! Every handler accepts a `CommandMetadata` instead of loose actor and
//! correlation parameters, so signatures stay stable as context grows.

use uuid::Uuid;

use super::Actor;

/// Metadata context for command handlers.
///
/// Carries the acting staff member and tracing context through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    /// The staff member executing this command (required for capability checks).
    pub actor: Actor,

    /// Links related operations across a single user request.
    correlation_id: Option<String>,

    /// Source of this command (e.g., "api", "queue-poller", "editor").
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates new command metadata for the given actor.
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            correlation_id: None,
            source: None,
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the correlation ID only if explicitly set.
    pub fn correlation_id_opt(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the source if set.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
