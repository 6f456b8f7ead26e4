use printquote_infra::{OutputSweeper, SweepReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::upload::UploadService;

/// Periodic sweep of expired uploads and stale engine output.
#[derive(Clone)]
pub struct CleanupService {
    uploads: UploadService,
    sweeper: OutputSweeper,
    output_ttl: Duration,
    period: Duration,
}

impl CleanupService {
    pub fn new(
        uploads: UploadService,
        sweeper: OutputSweeper,
        output_ttl: Duration,
        period: Duration,
    ) -> Self {
        Self {
            uploads,
            sweeper,
            output_ttl,
            period,
        }
    }

    /// Start the background cleanup task. It stops when `shutdown` is cancelled.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tracing::info!("Starting scheduled cleanup");
                self.run_once().await;
            }

            tracing::info!("Cleanup task stopped");
        })
    }

    /// One pass over uploads and engine output. Never fails.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "expire_all"))]
    pub async fn run_once(&self) -> (usize, SweepReport) {
        let uploads = match self.uploads.purge_expired().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Failed to cleanup expired uploads");
                0
            }
        };
        let outputs = self.sweeper.sweep(self.output_ttl).await;

        tracing::info!(
            uploads,
            outputs = outputs.deleted,
            failed = outputs.failed,
            "Cleanup completed"
        );
        (uploads, outputs)
    }
}
