//! Front Desk - Visitor Flow & Department Routing Engine
//!
//! Tracks visitors from scheduling or walk-in through check-in, department
//! hops and check-out, and projects live per-staff queues from the visit
//! store. Purpose edits are applied locally at once and written back after a
//! debounce window.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
