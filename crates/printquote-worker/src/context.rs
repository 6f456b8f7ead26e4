//! Slice runner trait
//!
//! The services layer implements this trait on top of the slicing engine and
//! the G-code parser. The queue calls `run` for one job at a time.

use async_trait::async_trait;
use printquote_core::models::{ParsedGCode, SliceJob};
use printquote_core::{AppError, SliceFailureKind};
use std::time::Duration;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct SliceOutcome {
    pub parsed: ParsedGCode,
    /// File name of the engine output.
    pub gcode_file_ref: String,
    pub engine_duration: Duration,
}

/// A job that reached `Succeeded`, with its outcome.
#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub job: SliceJob,
    pub outcome: SliceOutcome,
    pub queue_wait: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum SliceRunError {
    #[error(transparent)]
    Failed(#[from] AppError),

    #[error("slice job panicked: {0}")]
    Panicked(String),
}

impl From<SliceRunError> for AppError {
    fn from(err: SliceRunError) -> Self {
        match err {
            SliceRunError::Failed(e) => e,
            SliceRunError::Panicked(msg) => AppError::slice_failed(
                SliceFailureKind::Internal,
                format!("the slicing step crashed ({})", msg),
            ),
        }
    }
}

/// Runs one slice job to completion.
#[async_trait]
pub trait SliceRunner: Send + Sync {
    async fn run(&self, job: &SliceJob) -> Result<SliceOutcome, AppError>;
}
