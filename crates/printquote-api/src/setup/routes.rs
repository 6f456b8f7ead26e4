//! Route configuration and setup

use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES, OPENAPI_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use printquote_core::Config;
use printquote_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = (config.storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES) as usize;

    let app = api_routes()
        .merge(health_routes())
        .with_state(state)
        .route(OPENAPI_PATH, get(|| async { Json(crate::api_doc::get_openapi_spec()) }))
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware));

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/uploads", API_PREFIX),
            post(handlers::uploads::upload_model),
        )
        .route(
            &format!("{}/uploads/{{file_id}}", API_PREFIX),
            get(handlers::uploads::get_upload),
        )
        .route(
            &format!("{}/slice", API_PREFIX),
            post(handlers::slice::slice_model),
        )
}

fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness_check))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGINS entry: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
