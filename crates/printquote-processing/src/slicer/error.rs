use printquote_core::{AppError, SliceFailureKind};
use std::path::PathBuf;
use std::time::Duration;

use super::ProfileKind;

/// Longest stderr excerpt carried into client-visible errors.
const STDERR_EXCERPT_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum SlicerError {
    #[error("{kind} profile missing or unreadable at {path}")]
    ProfileMissing { kind: ProfileKind, path: PathBuf },

    #[error("slicing engine not found at {0}")]
    EngineNotFound(String),

    #[error("slicing engine at {0} is not executable")]
    EngineNotExecutable(String),

    #[error("input model {0} does not exist")]
    InputMissing(PathBuf),

    #[error("slicing engine did not finish within {0:?}")]
    Timeout(Duration),

    #[error("slicing engine exited with {}: {stderr}", exit_description(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("slicing engine reported success but {0}")]
    SilentFailure(String),

    #[error("slicing engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlicerError {
    /// Deployment problems rather than per-request engine failures.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SlicerError::ProfileMissing { .. }
                | SlicerError::EngineNotFound(_)
                | SlicerError::EngineNotExecutable(_)
        )
    }
}

impl From<SlicerError> for AppError {
    fn from(err: SlicerError) -> Self {
        match err {
            SlicerError::ProfileMissing { .. }
            | SlicerError::EngineNotFound(_)
            | SlicerError::EngineNotExecutable(_) => AppError::Configuration(err.to_string()),
            SlicerError::InputMissing(_) => {
                AppError::NotFound("Uploaded model is no longer available".to_string())
            }
            SlicerError::Timeout(limit) => AppError::slice_failed(
                SliceFailureKind::Timeout,
                format!("the slicing engine did not finish within {}s", limit.as_secs_f64()),
            ),
            SlicerError::NonZeroExit { code, stderr } => {
                let code = exit_description(&code);
                let detail = if stderr.trim().is_empty() {
                    format!("the slicing engine exited with {}", code)
                } else {
                    format!(
                        "the slicing engine exited with {}: {}",
                        code,
                        excerpt(&stderr)
                    )
                };
                AppError::slice_failed(SliceFailureKind::EngineExit, detail)
            }
            SlicerError::SilentFailure(reason) => AppError::slice_failed(
                SliceFailureKind::SilentFailure,
                format!("the slicing engine produced no usable output ({})", reason),
            ),
            SlicerError::Io(e) => AppError::slice_failed(
                SliceFailureKind::Internal,
                format!("engine I/O error: {}", e),
            ),
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "a signal".to_string(),
    }
}

/// Last `STDERR_EXCERPT_CHARS` characters of trimmed engine output.
fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let tail: String = trimmed.chars().skip(count - STDERR_EXCERPT_CHARS).collect();
    format!("...{}", tail)
}
