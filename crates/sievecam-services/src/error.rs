use thiserror::Error;

/// Downstream call errors
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("Invalid service credentials: {0}")]
    InvalidCredentials(String),

    #[error("Access token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Invalid outbound request: {0}")]
    InvalidRequest(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Result type for downstream operations
pub type DownstreamResult<T> = Result<T, DownstreamError>;

/// Read the body of a failed response for error reporting, capped so a large
/// HTML error page does not end up in the logs.
pub(crate) async fn status_error(response: reqwest::Response) -> DownstreamError {
    const MAX_BODY_CHARS: usize = 512;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    DownstreamError::Status {
        status,
        body: body.chars().take(MAX_BODY_CHARS).collect(),
    }
}
