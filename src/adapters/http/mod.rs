//! HTTP adapters - REST API over the `FrontDesk` facade.

pub mod middleware;
pub mod visit;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::application::FrontDesk;

pub use middleware::{RequireStaff, StaffContext, StaffRejection};
pub use visit::{visit_router, ApiError, VisitAppState};

/// Full API router: visit endpoints plus `/health`.
pub fn api_router(front_desk: Arc<FrontDesk>) -> Router {
    visit_router()
        .route("/health", get(visit::health))
        .with_state(VisitAppState::new(front_desk))
}
