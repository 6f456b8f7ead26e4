use std::sync::Arc;

use axum::{extract::State, Json};
use printquote_core::models::{InfillType, Material, PriceQuote, Quality, SlicerConfig};
use printquote_core::validation::{validate_infill_density, validate_quantity};
use printquote_services::QuoteRequest;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Slice request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SliceRequest {
    #[validate(length(min = 1, max = 64))]
    pub file_id: String,
    /// draft, standard, high or ultra
    pub quality: String,
    /// PLA, PETG, ABS or Resin
    pub material: String,
    #[validate(range(min = 5, max = 100))]
    pub infill_density: i64,
    pub infill_type: String,
    /// Number of copies, defaults to 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl SliceRequest {
    /// Validate every field and build the typed request.
    pub fn into_quote_request(self, max_quantity: u32) -> Result<QuoteRequest, HttpAppError> {
        self.validate().map_err(printquote_core::AppError::from)?;
        validate_infill_density(self.infill_density)?;
        let infill_density = self.infill_density as u8;

        let quality: Quality = self.quality.parse()?;
        let material: Material = self.material.parse()?;
        let infill_type: InfillType = self.infill_type.parse()?;
        let quantity = validate_quantity(self.quantity.unwrap_or(1), max_quantity)?;

        let config = SlicerConfig::new(quality, material, infill_density, infill_type)?;

        Ok(QuoteRequest {
            file_id: self.file_id,
            config,
            quantity,
        })
    }
}

/// Slice an uploaded model and return a price quote.
///
/// Requests are served one at a time by the slicing engine in arrival order;
/// this call waits for its turn.
#[utoipa::path(
    post,
    path = "/api/v0/slice",
    tag = "slice",
    request_body = SliceRequest,
    responses(
        (status = 200, description = "Quote computed", body = PriceQuote),
        (status = 400, description = "Invalid slicing parameters", body = ErrorResponse),
        (status = 404, description = "Unknown upload", body = ErrorResponse),
        (status = 410, description = "Upload expired", body = ErrorResponse),
        (status = 500, description = "Slicer misconfigured", body = ErrorResponse),
        (status = 502, description = "Slicing failed", body = ErrorResponse),
        (status = 503, description = "Slicing service shutting down", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(file_id = %request.file_id, operation = "slice_model"))]
pub async fn slice_model(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SliceRequest>,
) -> Result<Json<PriceQuote>, HttpAppError> {
    let request = request.into_quote_request(state.config.pricing.max_quantity)?;
    let quote = state.quotes.quote(request).await?;
    Ok(Json(quote))
}
