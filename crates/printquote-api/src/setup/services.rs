//! Service initialization

use crate::state::AppState;
use anyhow::{Context, Result};
use printquote_core::Config;
use printquote_db::{InMemoryUploadRepository, UploadRepository};
use printquote_infra::OutputSweeper;
use printquote_processing::{PricingEngine, SlicerInvoker};
use printquote_services::{CleanupService, EngineSliceRunner, QuoteService, UploadService};
use printquote_storage::LocalStorage;
use printquote_worker::SliceQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Initialize all services with the ephemeral in-memory upload repository.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    initialize_services_with_repository(config, Arc::new(InMemoryUploadRepository::new())).await
}

pub async fn initialize_services_with_repository(
    config: &Config,
    repository: Arc<dyn UploadRepository>,
) -> Result<Arc<AppState>> {
    let temp_dir = config.storage.temp_dir.clone();

    tracing::info!(temp_dir = %temp_dir.display(), "Initializing local storage...");
    let storage = LocalStorage::new(temp_dir.clone())
        .await
        .context("Failed to initialize TEMP_DIR")?;
    let uploads = UploadService::new(repository, Arc::new(storage), config.storage.clone());

    let slicer = SlicerInvoker::new(config.slicer.clone());
    let engine = slicer.health().await;
    if engine.is_usable() {
        tracing::info!(path = %engine.path, resolved = ?engine.resolved_path, "Slicing engine found");
    } else {
        tracing::error!(
            path = %engine.path,
            status = ?engine.status,
            "Slicing engine unavailable - slice requests will fail until SLICER_PATH is fixed"
        );
    }

    let sweeper = OutputSweeper::new(temp_dir.clone());
    let output_ttl = config.storage.output_ttl();
    let runner = EngineSliceRunner::new(slicer.clone(), sweeper.clone(), output_ttl);
    let queue = SliceQueue::start(Arc::new(runner));

    let quotes = QuoteService::new(
        uploads.clone(),
        queue.clone(),
        PricingEngine::new(config.pricing.clone()),
        temp_dir,
    );

    let shutdown = CancellationToken::new();
    if config.storage.sweep_interval_secs > 0 {
        let cleanup = Arc::new(CleanupService::new(
            uploads.clone(),
            sweeper,
            output_ttl,
            Duration::from_secs(config.storage.sweep_interval_secs),
        ));
        cleanup.start(shutdown.clone());
        tracing::info!(
            interval_secs = config.storage.sweep_interval_secs,
            "Started cleanup background task"
        );
    }

    Ok(Arc::new(AppState {
        config: config.clone(),
        uploads,
        quotes,
        slicer,
        queue,
        shutdown,
    }))
}
