//! HTTP middleware for axum.
//!
//! - `actor` - staff identity forwarded by the gateway

pub mod actor;

pub use actor::{RequireStaff, StaffContext, StaffRejection};
