use async_trait::async_trait;
use printquote_core::models::SliceJob;
use printquote_core::{AppError, SliceFailureKind};
use printquote_infra::OutputSweeper;
use printquote_processing::{parse_gcode, SlicerInvoker};
use printquote_worker::{SliceOutcome, SliceRunner};
use std::time::Duration;

/// Runs a queued job through the slicing engine and parses its output.
pub struct EngineSliceRunner {
    invoker: SlicerInvoker,
    sweeper: OutputSweeper,
    output_ttl: Duration,
}

impl EngineSliceRunner {
    pub fn new(invoker: SlicerInvoker, sweeper: OutputSweeper, output_ttl: Duration) -> Self {
        Self {
            invoker,
            sweeper,
            output_ttl,
        }
    }

    fn sweep_in_background(&self) {
        let sweeper = self.sweeper.clone();
        let ttl = self.output_ttl;
        tokio::spawn(async move {
            sweeper.sweep(ttl).await;
        });
    }
}

#[async_trait]
impl SliceRunner for EngineSliceRunner {
    #[tracing::instrument(skip(self, job), fields(job_id = %job.id, file_id = %job.upload.file_id))]
    async fn run(&self, job: &SliceJob) -> Result<SliceOutcome, AppError> {
        self.sweep_in_background();

        tracing::info!(output = %job.output_path.display(), "Slicing engine invocation started");
        let output = self
            .invoker
            .invoke(&job.upload.file_path, &job.output_path, &job.config)
            .await?;
        tracing::info!(
            duration_ms = output.duration.as_millis() as u64,
            output_bytes = output.output_bytes,
            "Slicing engine invocation finished"
        );

        let raw = tokio::fs::read(&output.output_path).await.map_err(|e| {
            AppError::slice_failed(
                SliceFailureKind::Internal,
                format!("engine output could not be read: {}", e),
            )
        })?;
        let text = String::from_utf8_lossy(&raw);
        let parsed = parse_gcode(&text, job.config.material.as_str());

        if !parsed.is_complete() {
            tracing::warn!(
                warnings = ?parsed.warning_messages(),
                "Engine output parsed with warnings"
            );
        }

        Ok(SliceOutcome {
            parsed,
            gcode_file_ref: job.output_file_name(),
            engine_duration: output.duration,
        })
    }
}
