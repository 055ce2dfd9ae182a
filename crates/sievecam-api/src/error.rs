//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. An `HttpAppError`
//! carries the `AppError` together with how the deployment wants failures
//! presented: either the uniform `401 Unauthorized` every caller sees by
//! default, or a status code and JSON body derived from `ErrorMetadata`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sievecam_core::{AppError, ErrorMetadata, ErrorPresentation, LogLevel};

/// Body text of every failure in uniform mode.
pub const UNIFORM_ERROR_BODY: &str = "Unauthorized";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub presentation: ErrorPresentation,
    pub production: bool,
}

impl HttpAppError {
    pub fn new(error: AppError, presentation: ErrorPresentation, production: bool) -> Self {
        Self {
            error,
            presentation,
            production,
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;
        log_error(app_error);

        match self.presentation {
            ErrorPresentation::Uniform => {
                (StatusCode::UNAUTHORIZED, UNIFORM_ERROR_BODY).into_response()
            }
            ErrorPresentation::Detailed => {
                let status = StatusCode::from_u16(app_error.http_status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                // Details never leave a production deployment or a sensitive error.
                let with_details = !self.production && !app_error.is_sensitive();
                let body = ErrorResponse::from_app_error(app_error, with_details);
                (status, Json(body)).into_response()
            }
        }
    }
}
