use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use utoipa::ToSchema;

#[derive(Debug, Default)]
pub(crate) struct QueueStats {
    pub pending: AtomicUsize,
    pub running: AtomicBool,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub cancelled: AtomicU64,
}

impl QueueStats {
    pub fn snapshot(&self) -> QueueStatsSnapshot {
        QueueStatsSnapshot {
            pending: self.pending.load(Ordering::SeqCst),
            running: self.running.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            cancelled: self.cancelled.load(Ordering::SeqCst),
        }
    }
}

/// Point-in-time view of the slice queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct QueueStatsSnapshot {
    /// Jobs waiting for the engine.
    pub pending: usize,
    /// Whether a job is inside the engine right now.
    pub running: bool,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}
