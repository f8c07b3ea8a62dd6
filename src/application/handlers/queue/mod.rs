//! Queue and reception read-model handlers.
//!
//! The per-viewer queue itself is served by `LiveQueueService`, which keeps a
//! polled snapshot; these handlers read the store directly on each request.

mod display_board;
mod reception;

pub use display_board::GetDisplayBoardHandler;
pub use reception::{GetReceptionLogHandler, GetReceptionLogQuery, GetReceptionSummaryHandler};
