//! Slice queue and runner seam.
//!
//! The slicing engine is run by exactly one worker task; every caller waits
//! on its own completion handle.

pub mod context;
pub mod queue;
pub mod stats;

pub use context::{CompletedJob, SliceOutcome, SliceRunError, SliceRunner};
pub use queue::{JobHandle, QueueError, SliceQueue};
pub use stats::QueueStatsSnapshot;
