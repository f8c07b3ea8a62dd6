//! Capability checker adapters.

mod role_capability_checker;

pub use role_capability_checker::RoleCapabilityChecker;
