//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `VisitStore` - whole-record reads and writes of visits
//! - `CapabilityChecker` - may this actor perform this operation
//! - `Clock` - the current instant

mod capability_checker;
mod clock;
mod visit_store;

pub use capability_checker::{CapabilityChecker, VisitOperation};
pub use clock::Clock;
pub use visit_store::VisitStore;
