use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use uuid::Uuid;

use super::{SlicerConfig, UploadRecord};

pub const OUTPUT_FILE_PREFIX: &str = "slice_";
pub const OUTPUT_FILE_EXTENSION: &str = ".gcode";

/// Whether `name` looks like a file produced by the slicing engine
/// (`slice_<millis>_<suffix>.gcode`). Only such files are swept.
pub fn is_engine_output_name(name: &str) -> bool {
    let Some(rest) = name
        .strip_prefix(OUTPUT_FILE_PREFIX)
        .and_then(|r| r.strip_suffix(OUTPUT_FILE_EXTENSION))
    else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl Display for JobState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobState::Queued => write!(f, "queued"),
            JobState::Running => write!(f, "running"),
            JobState::Succeeded => write!(f, "succeeded"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// One accepted slice request. Owned by the slice queue until it reaches a
/// terminal state.
#[derive(Debug, Clone)]
pub struct SliceJob {
    pub id: Uuid,
    pub upload: UploadRecord,
    pub config: SlicerConfig,
    pub output_path: PathBuf,
    pub state: JobState,
    pub submitted_at: DateTime<Utc>,
}

impl SliceJob {
    pub fn new(upload: UploadRecord, config: SlicerConfig, output_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            upload,
            config,
            output_path,
            state: JobState::Queued,
            submitted_at: Utc::now(),
        }
    }

    /// File name of the engine output, used as the quote's G-code reference.
    pub fn output_file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
