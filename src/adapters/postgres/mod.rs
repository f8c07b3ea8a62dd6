//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresVisitStore` - one row per visit, segments as JSONB

mod visit_store;

pub use visit_store::PostgresVisitStore;
