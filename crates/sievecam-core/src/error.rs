//! Error types module
//!
//! All failures on the upload path are unified under `AppError`. Each variant
//! self-describes how it is reported through `ErrorMetadata`; whether that
//! description reaches the client is decided by the HTTP layer.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected failures like bad credentials or missing fields
    Debug,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DOWNSTREAM_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// The external collaborator a downstream failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownstreamService {
    FileStore,
    TrainingIntake,
}

impl Display for DownstreamService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DownstreamService::FileStore => write!(f, "file_store"),
            DownstreamService::TrainingIntake => write!(f, "training_intake"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, malformed, tampered or expired credential.
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// Malformed multipart body or missing form fields.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// An outbound call to a downstream service failed.
    #[error("Downstream error ({service}): {message}")]
    Downstream {
        service: DownstreamService,
        message: String,
    },

    /// A failure inside the gateway itself.
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::Auth(_) => (401, "UNAUTHORIZED", false, false, LogLevel::Debug),
        AppError::Validation(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::Downstream { .. } => (502, "DOWNSTREAM_ERROR", true, true, LogLevel::Error),
        AppError::Internal { .. } => (500, "INTERNAL_ERROR", false, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Auth(_) => "AuthError",
            AppError::Validation(_) => "ValidationError",
            AppError::Downstream { .. } => "DownstreamError",
            AppError::Internal { .. } => "Internal",
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

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Auth(_) => "Unauthorized".to_string(),
            AppError::Validation(ref msg) => msg.clone(),
            AppError::Downstream { service, .. } => {
                format!("Upstream service '{}' failed", service)
            }
            AppError::Internal { .. } => "Internal server error".to_string(),
        }
    }
}
