use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue a short-lived upload token
///
/// Any caller may obtain a token; it only proves that it was issued by this
/// server within the last few minutes.
#[tracing::instrument(skip(state), fields(operation = "issue_token"))]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let token = state.tokens.issue().map_err(|e| state.http_error(e))?;
    tracing::debug!(ttl_secs = state.tokens.ttl().num_seconds(), "Issued upload token");
    Ok(Json(TokenResponse { token }))
}
