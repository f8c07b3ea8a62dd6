//! GetDisplayBoardHandler - Query handler for the waiting-area screen.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::queue::DisplayBoard;
use crate::domain::visit::VisitError;
use crate::ports::{Clock, VisitStore};

/// Handler building the visitor display board from a fresh snapshot.
pub struct GetDisplayBoardHandler {
    store: Arc<dyn VisitStore>,
    clock: Arc<dyn Clock>,
    call_window: Duration,
}

impl GetDisplayBoardHandler {
    pub fn new(store: Arc<dyn VisitStore>, clock: Arc<dyn Clock>, call_window: Duration) -> Self {
        Self {
            store,
            clock,
            call_window,
        }
    }

    pub async fn handle(&self) -> Result<DisplayBoard, VisitError> {
        let visits = self.store.list_visits().await?;
        Ok(DisplayBoard::build(&visits, &self.clock.now(), self.call_window))
    }
}
