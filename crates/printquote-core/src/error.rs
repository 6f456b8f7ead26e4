//! Error types module
//!
//! This module provides the core error type used throughout printquote.
//! Every failure a client can observe is folded into `AppError`, which
//! self-describes its HTTP status, machine-readable code and log level through
//! the `ErrorMetadata` trait.

use std::fmt;
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like engine timeouts
    Warn,
    /// Error level - for unexpected failures and deployment misconfiguration
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SLICING_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Sub-classification of a failed slice.
///
/// All kinds share the `SLICING_FAILED` code; the kind only selects the
/// suggested action and the log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceFailureKind {
    /// The engine exceeded the wall-clock timeout.
    Timeout,
    /// The engine exited with a non-zero status.
    EngineExit,
    /// The engine reported success but produced no (or an empty) output file.
    SilentFailure,
    /// The output carried no usable directives and strict parsing is enabled.
    Unparseable,
    /// Anything else that went wrong inside the slicing step.
    Internal,
}

impl fmt::Display for SliceFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SliceFailureKind::Timeout => "timeout",
            SliceFailureKind::EngineExit => "engine_exit",
            SliceFailureKind::SilentFailure => "silent_failure",
            SliceFailureKind::Unparseable => "unparseable",
            SliceFailureKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Expired: {0}")]
    Gone(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Slicing failed ({kind}): {detail}")]
    SliceFailed {
        kind: SliceFailureKind,
        detail: String,
    },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn slice_failed(kind: SliceFailureKind, detail: impl Into<String>) -> Self {
        AppError::SliceFailed {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFileType(_) => (
            400,
            "UNSUPPORTED_FILE_TYPE",
            false,
            Some("Upload a .stl, .obj, .3mf, .fbx, .gltf or .glb file"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the model file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Upload the model again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Gone(_) => (
            410,
            "FILE_EXPIRED",
            false,
            Some("Upload the model again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            Some("Contact support; the slicing service is misconfigured"),
            true,
            LogLevel::Error,
        ),
        AppError::SliceFailed { kind, .. } => {
            let (action, level) = match kind {
                SliceFailureKind::Timeout => (
                    "Simplify the model or raise SLICER_TIMEOUT_MS, then retry",
                    LogLevel::Warn,
                ),
                SliceFailureKind::EngineExit => (
                    "Check the model geometry or change print settings, then retry",
                    LogLevel::Warn,
                ),
                SliceFailureKind::SilentFailure => (
                    "Retry; contact support if this error persists",
                    LogLevel::Error,
                ),
                SliceFailureKind::Unparseable => (
                    "Retry with different print settings",
                    LogLevel::Warn,
                ),
                SliceFailureKind::Internal => (
                    "Retry after a short delay",
                    LogLevel::Error,
                ),
            };
            (502, "SLICING_FAILED", true, Some(action), false, level)
        }
        AppError::ServiceUnavailable(_) => (
            503,
            "SERVICE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedFileType(_) => "UnsupportedFileType",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::Gone(_) => "Gone",
            AppError::Configuration(_) => "Configuration",
            AppError::SliceFailed { .. } => "SliceFailed",
            AppError::ServiceUnavailable(_) => "ServiceUnavailable",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UnsupportedFileType(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Gone(ref msg) => msg.clone(),
            AppError::Configuration(_) => "Slicing service is misconfigured".to_string(),
            AppError::SliceFailed { detail, .. } => format!("Slicing failed: {}", detail),
            AppError::ServiceUnavailable(ref msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
