//! GetVisitHandler - Query handler for one visit and its journey.

use std::sync::Arc;

use crate::domain::foundation::VisitId;
use crate::domain::visit::{Visit, VisitError, VisitJourney};
use crate::ports::{Clock, VisitStore};

use super::load_visit;

/// Query to get a visit by ID.
#[derive(Debug, Clone)]
pub struct GetVisitQuery {
    pub visit_id: VisitId,
}

/// A visit together with its per-stop timings.
#[derive(Debug, Clone)]
pub struct VisitView {
    pub visit: Visit,
    pub journey: VisitJourney,
}

/// Handler for retrieving visit details.
pub struct GetVisitHandler {
    store: Arc<dyn VisitStore>,
    clock: Arc<dyn Clock>,
}

impl GetVisitHandler {
    pub fn new(store: Arc<dyn VisitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn handle(&self, query: GetVisitQuery) -> Result<VisitView, VisitError> {
        let visit = load_visit(self.store.as_ref(), &query.visit_id).await?;
        let journey = VisitJourney::of(&visit, &self.clock.now());
        Ok(VisitView { visit, journey })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn returns_journey_up_to_now() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![walk_in(
            "w",
            "Admissions",
            1,
            start().plus_secs(-900),
        )]));
        let handler = GetVisitHandler::new(store, clock());

        let view = handler
            .handle(GetVisitQuery {
                visit_id: VisitId::new("w").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(view.journey.stops.len(), 1);
        assert_eq!(view.journey.stops[0].time_spent, Some(Duration::seconds(900)));
        assert!(view.journey.is_open);
    }

    #[tokio::test]
    async fn missing_visit_is_not_found() {
        let handler = GetVisitHandler::new(Arc::new(InMemoryVisitStore::new()), clock());
        let err = handler
            .handle(GetVisitQuery {
                visit_id: VisitId::new("ghost").unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::NotFound(_)));
    }
}
