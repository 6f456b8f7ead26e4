use printquote_core::models::{PriceQuote, SliceJob, SlicerConfig};
use printquote_core::validation::validate_quantity;
use printquote_core::{generate_output_name, AppError, SliceFailureKind};
use printquote_processing::PricingEngine;
use printquote_worker::SliceQueue;
use std::path::PathBuf;

use crate::upload::UploadService;

/// A validated slice request.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub file_id: String,
    pub config: SlicerConfig,
    pub quantity: u32,
}

/// Quote assembler: resolves the upload, waits for the engine through the
/// queue and prices the parsed metrics.
#[derive(Clone)]
pub struct QuoteService {
    uploads: UploadService,
    queue: SliceQueue,
    pricing: PricingEngine,
    output_dir: PathBuf,
}

impl QuoteService {
    pub fn new(
        uploads: UploadService,
        queue: SliceQueue,
        pricing: PricingEngine,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            uploads,
            queue,
            pricing,
            output_dir: output_dir.into(),
        }
    }

    pub fn queue(&self) -> &SliceQueue {
        &self.queue
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Slice an uploaded model and price the result.
    ///
    /// Validation and upload resolution happen before anything is queued, so
    /// rejected requests never reach the engine.
    #[tracing::instrument(
        skip(self, request),
        fields(
            file_id = %request.file_id,
            quality = %request.config.quality,
            material = %request.config.material,
            quantity = request.quantity,
        )
    )]
    pub async fn quote(&self, request: QuoteRequest) -> Result<PriceQuote, AppError> {
        let QuoteRequest {
            file_id,
            config,
            quantity,
        } = request;
        let quantity = validate_quantity(
            i64::from(quantity),
            self.pricing.settings().max_quantity,
        )?;

        let upload = self.uploads.get(&file_id).await?;
        if !self.uploads.bytes_present(&upload).await? {
            tracing::warn!(file_id = %file_id, "Upload bytes missing, invalidating record");
            self.uploads.invalidate(&file_id).await?;
            return Err(AppError::NotFound(format!(
                "Upload {} is no longer available, please upload the file again",
                file_id
            )));
        }

        let material = config.material;
        let output_path = self.output_dir.join(generate_output_name());
        let job = SliceJob::new(upload, config, output_path);
        let job_id = job.id;

        let completed = self.queue.submit(job).await?;
        let parsed = completed.outcome.parsed;

        if parsed.is_unparseable() && self.pricing.settings().reject_incomplete_gcode {
            tracing::warn!(
                job_id = %job_id,
                gcode_file_ref = %completed.outcome.gcode_file_ref,
                "Engine output contained no usable metrics"
            );
            return Err(AppError::slice_failed(
                SliceFailureKind::Unparseable,
                "engine output contained no print time, layer count or extrusion",
            ));
        }

        let mut quote = self.pricing.price(
            &parsed.metrics,
            material,
            quantity,
            completed.outcome.gcode_file_ref,
        );
        quote.warnings = parsed.warning_messages();

        tracing::info!(
            job_id = %job_id,
            quote_id = %quote.quote_id,
            item_total = quote.item_total,
            subtotal = quote.subtotal,
            queue_wait_ms = completed.queue_wait.as_millis() as u64,
            engine_ms = completed.outcome.engine_duration.as_millis() as u64,
            complete = quote.warnings.is_empty(),
            "Quote computed"
        );
        Ok(quote)
    }
}
