//! FrontDesk - the engine's single entry point.
//!
//! Wires the visit handlers, the live queue and the field editor around one
//! shared [`VisitCache`]. Every successful write is mirrored into the cache;
//! failed writes leave it untouched.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{CommandMetadata, ContactId, VisitId};
use crate::domain::queue::{
    DisplayBoard, LogFilter, QueueProjection, QueueProjector, ReceptionLog, ReceptionSummary,
    ViewMode, Viewer,
};
use crate::domain::visit::{DailySequencer, Visit, VisitError};
use crate::ports::{CapabilityChecker, Clock, VisitOperation, VisitStore};

use super::cache::VisitCache;
use super::field_editor::{EditStatus, EditorConfig, FieldEditor};
use super::handlers::visit::{ensure_allowed, load_visit};
use super::handlers::{
    CallVisitorCommand, CallVisitorHandler, CheckInLock, CheckInVisitCommand, CheckInVisitHandler,
    CheckOutVisitCommand, CheckOutVisitHandler, DeleteVisitCommand, DeleteVisitHandler,
    ForwardVisitCommand, ForwardVisitHandler, GetDisplayBoardHandler, GetReceptionLogHandler,
    GetReceptionLogQuery, GetReceptionSummaryHandler, GetVisitHandler, GetVisitQuery,
    ListContactVisitsHandler, ListContactVisitsQuery, RecordMilestoneCommand,
    RecordMilestoneHandler, ScheduleVisitCommand, ScheduleVisitHandler, UpdateVisitDetailsCommand,
    UpdateVisitDetailsHandler, VisitView, WalkInCommand, WalkInHandler,
};
use super::live_queue::{CallNextOutcome, LiveQueueService, QueueSubscription};

/// Tunables of the engine.
#[derive(Debug, Clone, Default)]
pub struct FrontDeskConfig {
    pub sequencer: DailySequencer,
    pub projector: QueueProjector,
    pub editor: EditorConfig,
}

/// Facade over every visitor-flow operation.
pub struct FrontDesk {
    store: Arc<dyn VisitStore>,
    checker: Arc<dyn CapabilityChecker>,
    cache: VisitCache,
    editor: FieldEditor,
    queue: LiveQueueService,

    schedule: ScheduleVisitHandler,
    walk_in: WalkInHandler,
    check_in: CheckInVisitHandler,
    check_out: CheckOutVisitHandler,
    call: CallVisitorHandler,
    forward: ForwardVisitHandler,
    milestone: RecordMilestoneHandler,
    details: UpdateVisitDetailsHandler,
    delete: DeleteVisitHandler,
    get: GetVisitHandler,
    history: ListContactVisitsHandler,
    log: GetReceptionLogHandler,
    summary: GetReceptionSummaryHandler,
    board: GetDisplayBoardHandler,
}

impl FrontDesk {
    pub fn new(
        store: Arc<dyn VisitStore>,
        checker: Arc<dyn CapabilityChecker>,
        clock: Arc<dyn Clock>,
        config: FrontDeskConfig,
    ) -> Self {
        let cache = VisitCache::new();
        let lock = CheckInLock::new();
        let call_window = config.projector.call_window();

        Self {
            editor: FieldEditor::new(store.clone(), cache.clone(), config.editor),
            queue: LiveQueueService::new(
                store.clone(),
                checker.clone(),
                clock.clone(),
                cache.clone(),
                config.projector,
            ),
            schedule: ScheduleVisitHandler::new(store.clone(), checker.clone(), clock.clone()),
            walk_in: WalkInHandler::new(
                store.clone(),
                checker.clone(),
                clock.clone(),
                config.sequencer,
                lock.clone(),
            ),
            check_in: CheckInVisitHandler::new(
                store.clone(),
                checker.clone(),
                clock.clone(),
                config.sequencer,
                lock,
            ),
            check_out: CheckOutVisitHandler::new(store.clone(), checker.clone(), clock.clone()),
            call: CallVisitorHandler::new(store.clone(), checker.clone(), clock.clone()),
            forward: ForwardVisitHandler::new(store.clone(), checker.clone(), clock.clone()),
            milestone: RecordMilestoneHandler::new(store.clone(), checker.clone()),
            details: UpdateVisitDetailsHandler::new(store.clone(), checker.clone()),
            delete: DeleteVisitHandler::new(store.clone(), checker.clone()),
            get: GetVisitHandler::new(store.clone(), clock.clone()),
            history: ListContactVisitsHandler::new(store.clone()),
            log: GetReceptionLogHandler::new(store.clone()),
            summary: GetReceptionSummaryHandler::new(store.clone(), clock.clone(), config.sequencer),
            board: GetDisplayBoardHandler::new(store.clone(), clock, call_window),
            store,
            checker,
            cache,
        }
    }

    pub fn cache(&self) -> &VisitCache {
        &self.cache
    }

    pub fn editor(&self) -> &FieldEditor {
        &self.editor
    }

    pub fn queue(&self) -> &LiveQueueService {
        &self.queue
    }

    async fn mirror(&self, visit: Visit) -> Visit {
        self.cache.upsert(visit.clone()).await;
        visit
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    pub async fn schedule(&self, cmd: ScheduleVisitCommand, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        let visit = self.schedule.handle(cmd, metadata).await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn walk_in(&self, cmd: WalkInCommand, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        let visit = self.walk_in.handle(cmd, metadata).await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn check_in(&self, visit_id: VisitId, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        let visit = self
            .check_in
            .handle(CheckInVisitCommand { visit_id }, metadata)
            .await?;
        Ok(self.mirror(visit).await)
    }

    /// Checks a visitor out after writing any pending purpose edits.
    ///
    /// A refused check-out writes nothing. A failed flush aborts the
    /// check-out so unsaved text is not stranded on a closed visit.
    pub async fn check_out(&self, visit_id: VisitId, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        let cmd = CheckOutVisitCommand { visit_id };
        self.check_out.authorize(&cmd, &metadata).await?;
        self.editor.flush(&cmd.visit_id).await?;
        let visit = self.check_out.handle(cmd, metadata).await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn call(&self, visit_id: VisitId, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        let visit = self
            .call
            .handle(CallVisitorCommand { visit_id }, metadata)
            .await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn forward(&self, cmd: ForwardVisitCommand, metadata: CommandMetadata) -> Result<Visit, VisitError> {
        let visit = self.forward.handle(cmd, metadata).await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn record_milestone(
        &self,
        cmd: RecordMilestoneCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let visit = self.milestone.handle(cmd, metadata).await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn update_details(
        &self,
        cmd: UpdateVisitDetailsCommand,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let visit = self.details.handle(cmd, metadata).await?;
        Ok(self.mirror(visit).await)
    }

    pub async fn delete(&self, visit_id: VisitId, metadata: CommandMetadata) -> Result<(), VisitError> {
        self.delete
            .handle(
                DeleteVisitCommand {
                    visit_id: visit_id.clone(),
                },
                metadata,
            )
            .await?;
        self.editor.discard(&visit_id);
        self.cache.remove(&visit_id).await;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Optimistic purpose editing
    // ─────────────────────────────────────────────────────────────────────

    /// Applies a purpose edit locally; the write follows after the debounce.
    pub async fn edit_purpose(
        &self,
        visit_id: &VisitId,
        segment_index: usize,
        purpose: String,
        metadata: CommandMetadata,
    ) -> Result<Visit, VisitError> {
        let visit = match self.cache.get(visit_id).await {
            Some(visit) => visit,
            None => load_visit(self.store.as_ref(), visit_id).await?,
        };
        ensure_allowed(
            self.checker.as_ref(),
            &metadata.actor,
            Some(&visit),
            VisitOperation::EditPurpose,
        )?;
        self.editor.edit_purpose(visit_id, segment_index, purpose).await
    }

    pub fn edit_status(&self, visit_id: &VisitId) -> Option<EditStatus> {
        self.editor.status(visit_id)
    }

    pub async fn retry_edits(&self, visit_id: &VisitId) -> usize {
        self.editor.retry(visit_id).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queue
    // ─────────────────────────────────────────────────────────────────────

    pub async fn refresh(&self) -> Result<usize, VisitError> {
        self.queue.refresh().await
    }

    pub async fn queue_for(&self, viewer: &Viewer, mode: ViewMode) -> Result<QueueProjection, VisitError> {
        self.queue.current(viewer, mode).await
    }

    pub async fn call_next(&self, metadata: CommandMetadata, mode: ViewMode) -> Result<CallNextOutcome, VisitError> {
        self.queue.call_next(metadata, mode).await
    }

    pub fn subscribe(&self, viewer: Viewer, mode: ViewMode, interval: Duration) -> QueueSubscription {
        self.queue.subscribe(viewer, mode, interval)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    pub async fn visit(&self, visit_id: VisitId) -> Result<VisitView, VisitError> {
        self.get.handle(GetVisitQuery { visit_id }).await
    }

    pub async fn contact_history(&self, contact_id: ContactId) -> Result<Vec<Visit>, VisitError> {
        self.history.handle(ListContactVisitsQuery { contact_id }).await
    }

    pub async fn reception_log(&self, filter: LogFilter) -> Result<ReceptionLog, VisitError> {
        self.log.handle(GetReceptionLogQuery { filter }).await
    }

    pub async fn reception_summary(&self) -> Result<ReceptionSummary, VisitError> {
        self.summary.handle().await
    }

    pub async fn display_board(&self) -> Result<DisplayBoard, VisitError> {
        self.board.handle().await
    }

    /// Writes every pending edit. Returns the visits left unsaved.
    pub async fn shutdown(&self) -> Vec<VisitId> {
        self.editor.shutdown().await
    }
}
