//! Printquote Infrastructure Library
//!
//! Shared infrastructure used by the HTTP service and the CLI:
//! - Telemetry initialization
//! - Middleware (request ID)
//! - Engine-output cleanup

pub mod cleanup;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use cleanup::{OutputSweeper, SweepReport};
pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, shutdown_telemetry};
