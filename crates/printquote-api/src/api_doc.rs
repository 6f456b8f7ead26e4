//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use printquote_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Printquote API",
        version = "0.1.0",
        description = "Upload a 3D model, slice it with the configured engine and receive a price quote. All business endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::uploads::upload_model,
        handlers::uploads::get_upload,
        handlers::slice::slice_model,
        handlers::health::health_check,
    ),
    components(schemas(
        ErrorResponse,
        handlers::slice::SliceRequest,
        handlers::health::HealthResponse,
        models::UploadResponse,
        models::ModelExtension,
        models::PriceQuote,
        printquote_processing::EngineCheck,
        printquote_processing::EngineStatus,
        printquote_worker::QueueStatsSnapshot,
    )),
    tags(
        (name = "uploads", description = "Temporary model uploads"),
        (name = "slice", description = "Slicing and quoting"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
