//! Application state shared by all handlers.

use printquote_core::Config;
use printquote_processing::SlicerInvoker;
use printquote_services::{QuoteService, UploadService};
use printquote_worker::SliceQueue;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub uploads: UploadService,
    pub quotes: QuoteService,
    /// Used by the health check; slicing itself goes through the queue.
    pub slicer: SlicerInvoker,
    pub queue: SliceQueue,
    /// Cancelled on shutdown; stops background tasks.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Stop background work and refuse new slice jobs.
    pub fn begin_shutdown(&self) {
        self.shutdown.cancel();
        self.queue.shutdown();
    }
}
