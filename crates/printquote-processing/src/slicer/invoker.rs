use printquote_core::models::SlicerConfig;
use printquote_core::SlicerSettings;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::{build_args, check_engine, EngineCheck, EngineStatus, ProfileSet, SlicerError};

/// How long to wait for the output readers once the engine has exited.
const READER_GRACE: Duration = Duration::from_secs(2);
const READ_CHUNK: usize = 8 * 1024;

/// A finished, non-empty engine output.
#[derive(Debug, Clone)]
pub struct SliceOutput {
    pub output_path: PathBuf,
    pub output_bytes: u64,
    pub duration: Duration,
    /// Captured engine stderr (capped).
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct SlicerInvoker {
    settings: SlicerSettings,
}

impl SlicerInvoker {
    pub fn new(settings: SlicerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SlicerSettings {
        &self.settings
    }

    pub async fn health(&self) -> EngineCheck {
        check_engine(&self.settings.path).await
    }

    /// Run the engine on `input`, writing `output`.
    ///
    /// Any failure removes whatever the engine left at `output`.
    #[tracing::instrument(
        skip(self, config),
        fields(
            input = %input.display(),
            output = %output.display(),
            quality = %config.quality,
            material = %config.material,
            infill_density = config.infill_density,
            infill_type = %config.infill_type,
        )
    )]
    pub async fn invoke(
        &self,
        input: &Path,
        output: &Path,
        config: &SlicerConfig,
    ) -> Result<SliceOutput, SlicerError> {
        let result = self.run(input, output, config).await;
        if let Err(e) = &result {
            if e.is_configuration() {
                tracing::error!(error = %e, "Slicing engine misconfigured");
            } else {
                tracing::warn!(error = %e, "Slicing engine invocation failed");
            }
            remove_partial_output(output).await;
        }
        result
    }

    async fn run(
        &self,
        input: &Path,
        output: &Path,
        config: &SlicerConfig,
    ) -> Result<SliceOutput, SlicerError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(SlicerError::InputMissing(input.to_path_buf()));
        }

        let profiles = ProfileSet::resolve(&self.settings.profiles_dir, config);
        profiles.validate().await?;

        let engine = check_engine(&self.settings.path).await;
        match engine.status {
            EngineStatus::Installed => {}
            EngineStatus::NotInstalled => {
                return Err(SlicerError::EngineNotFound(self.settings.path.clone()))
            }
            EngineStatus::NotExecutable => {
                return Err(SlicerError::EngineNotExecutable(self.settings.path.clone()))
            }
        }

        let args = build_args(&self.settings.extra_args, &profiles, config, input, output);

        let started = Instant::now();
        let mut child = Command::new(&self.settings.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    SlicerError::EngineNotFound(self.settings.path.clone())
                }
                std::io::ErrorKind::PermissionDenied => {
                    SlicerError::EngineNotExecutable(self.settings.path.clone())
                }
                _ => SlicerError::Io(e),
            })?;

        tracing::info!(pid = child.id(), "Slicing engine started");

        let cap = self.settings.max_output_bytes;
        let stdout_task = tokio::spawn(read_capped(child.stdout.take(), cap));
        let stderr_task = tokio::spawn(read_capped(child.stderr.take(), cap));

        let status = match tokio::time::timeout(self.settings.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill timed-out slicing engine");
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(SlicerError::Timeout(self.settings.timeout));
            }
        };

        let (stdout, stdout_truncated) = collect(stdout_task).await;
        let (stderr, stderr_truncated) = collect(stderr_task).await;
        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        let duration = started.elapsed();

        tracing::debug!(
            stdout_bytes = stdout.len(),
            stdout_truncated,
            stderr_truncated,
            "Slicing engine output captured"
        );

        if !status.success() {
            return Err(SlicerError::NonZeroExit {
                code: status.code(),
                stderr,
            });
        }

        let output_bytes = match tokio::fs::metadata(output).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            Ok(meta) if meta.is_file() => {
                return Err(SlicerError::SilentFailure(
                    "the output file is empty".to_string(),
                ))
            }
            Ok(_) | Err(_) => {
                return Err(SlicerError::SilentFailure(
                    "no output file was written".to_string(),
                ))
            }
        };

        tracing::info!(
            duration_ms = duration.as_millis() as u64,
            output_bytes,
            "Slicing engine finished"
        );

        Ok(SliceOutput {
            output_path: output.to_path_buf(),
            output_bytes,
            duration,
            stderr,
        })
    }
}

/// Read a stream to EOF, keeping at most `cap` bytes.
///
/// The rest is drained and discarded so the engine never blocks on a full pipe.
async fn read_capped<R>(reader: Option<R>, cap: usize) -> (Vec<u8>, bool)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return (Vec::new(), false);
    };
    let mut kept = Vec::new();
    let mut truncated = false;
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = cap.saturating_sub(kept.len());
                if n > room {
                    truncated = true;
                }
                kept.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }
    (kept, truncated)
}

async fn collect(task: JoinHandle<(Vec<u8>, bool)>) -> (Vec<u8>, bool) {
    match tokio::time::timeout(READER_GRACE, task).await {
        Ok(Ok(captured)) => captured,
        Ok(Err(_)) | Err(_) => (Vec::new(), true),
    }
}

async fn remove_partial_output(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => tracing::debug!(path = %output.display(), "Removed partial engine output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %output.display(),
            error = %e,
            "Failed to remove partial engine output"
        ),
    }
}
