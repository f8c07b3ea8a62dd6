//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, actor)
//! - `visit` - Visit aggregate, lifecycle, daily sequencing and journey
//! - `queue` - Per-viewer queue projection, display board, reception views

pub mod foundation;
pub mod queue;
pub mod visit;
