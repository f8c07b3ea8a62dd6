//! ListContactVisitsHandler - Visit history for one contact.

use std::sync::Arc;

use crate::domain::foundation::ContactId;
use crate::domain::visit::{Visit, VisitError};
use crate::ports::VisitStore;

/// Query for a contact's visits.
#[derive(Debug, Clone)]
pub struct ListContactVisitsQuery {
    pub contact_id: ContactId,
}

/// Handler returning a contact's visits, most recent first.
pub struct ListContactVisitsHandler {
    store: Arc<dyn VisitStore>,
}

impl ListContactVisitsHandler {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListContactVisitsQuery) -> Result<Vec<Visit>, VisitError> {
        let mut visits = self.store.list_visits_for_contact(&query.contact_id).await?;
        visits.sort_by(|a, b| history_time(b).cmp(&history_time(a)));
        Ok(visits)
    }
}

fn history_time(visit: &Visit) -> crate::domain::foundation::Timestamp {
    visit
        .check_in_time()
        .or(visit.scheduled_check_in_time())
        .copied()
        .unwrap_or(*visit.created_at())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryVisitStore;
    use crate::application::handlers::visit::test_support::*;
    use crate::domain::foundation::VisitId;
    use crate::domain::visit::{HostTarget, VisitorDetails};

    fn visit_for(id: &str, contact: &str, offset: i64) -> Visit {
        Visit::walk_in(
            VisitId::new(id).unwrap(),
            VisitorDetails::new("Asha").with_contact(ContactId::new(contact).unwrap()),
            HostTarget::new("Admissions"),
            None,
            1,
            start().plus_secs(offset),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_contact_visits_newest_first() {
        let store = Arc::new(InMemoryVisitStore::with_visits(vec![
            visit_for("old", "c-1", -86_400 * 3),
            visit_for("other", "c-2", -60),
            visit_for("new", "c-1", -600),
        ]));
        let handler = ListContactVisitsHandler::new(store);

        let visits = handler
            .handle(ListContactVisitsQuery {
                contact_id: ContactId::new("c-1").unwrap(),
            })
            .await
            .unwrap();

        let ids: Vec<&str> = visits.iter().map(|v| v.id().as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}
