//! Reception desk query handlers: the visit log and headline counters.

use std::sync::Arc;

use crate::domain::queue::{LogFilter, ReceptionLog, ReceptionSummary};
use crate::domain::visit::{DailySequencer, VisitError};
use crate::ports::{Clock, VisitStore};

/// Query for the reception log.
#[derive(Debug, Clone, Default)]
pub struct GetReceptionLogQuery {
    pub filter: LogFilter,
}

/// Handler for the searchable reception log.
pub struct GetReceptionLogHandler {
    store: Arc<dyn VisitStore>,
}

impl GetReceptionLogHandler {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetReceptionLogQuery) -> Result<ReceptionLog, VisitError> {
        let visits = self.store.list_visits().await?;
        Ok(ReceptionLog::build(&visits, &query.filter))
    }
}

/// Handler for today's reception counters.
pub struct GetReceptionSummaryHandler {
    store: Arc<dyn VisitStore>,
    clock: Arc<dyn Clock>,
    sequencer: DailySequencer,
}

impl GetReceptionSummaryHandler {
    pub fn new(store: Arc<dyn VisitStore>, clock: Arc<dyn Clock>, sequencer: DailySequencer) -> Self {
        Self {
            store,
            clock,
            sequencer,
        }
    }

    pub async fn handle(&self) -> Result<ReceptionSummary, VisitError> {
        let visits = self.store.list_visits().await?;
        Ok(ReceptionSummary::compute(&visits, &self.sequencer, &self.clock.now()))
    }
}
