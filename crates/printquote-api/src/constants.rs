//! API constants

pub const API_VERSION: &str = "v0";

/// Versioned prefix for every business route.
pub const API_PREFIX: &str = "/api/v0";

pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Room for multipart boundaries and headers on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;
