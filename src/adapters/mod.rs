//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `memory` - in-process visit store for tests and demos
//! - `rest` - the portal's visitor REST API
//! - `postgres` - PostgreSQL visit table
//! - `access` - role based capability checks
//! - `clock` - system and manual clocks
//! - `http` - axum API over the `FrontDesk` facade

pub mod access;
pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rest;

pub use access::RoleCapabilityChecker;
pub use clock::{ManualClock, SystemClock};
pub use memory::InMemoryVisitStore;
pub use postgres::PostgresVisitStore;
pub use rest::{RestStoreConfig, RestVisitStore};
