//! REST adapter for the portal's visitor API.

mod visit_store;

pub use visit_store::{RestStoreConfig, RestVisitStore};
