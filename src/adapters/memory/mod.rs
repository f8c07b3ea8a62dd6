//! In-memory adapters.

mod visit_store;

pub use visit_store::InMemoryVisitStore;
