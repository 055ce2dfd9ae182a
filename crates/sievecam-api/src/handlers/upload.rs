use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
};
use chrono::Utc;
use sievecam_core::{build_filename, sanitize_comment, AppError};
use sievecam_services::PhotoUpload;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;

/// Content type sent to the file store for every photo.
const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// Upload photo handler
///
/// Verifies the upload token, derives the filename from the labels, the
/// sanitized comment and the current time, then forwards the photo to the
/// file store and the training intake.
///
/// # Errors
/// - `AppError::Auth` - token missing, invalid or expired
/// - `AppError::Validation` - not a multipart body, or a required field is missing
/// - `AppError::Downstream` - the file store or the training intake failed
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_photo"))]
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    accept_upload(&state, multipart)
        .await
        .map_err(|e| state.http_error(e))?;
    Ok("OK")
}

async fn accept_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(), AppError> {
    let multipart = multipart
        .map_err(|e| AppError::Validation(format!("Expected a multipart form: {}", e)))?;
    let mut form = extract_upload_form(multipart).await?;

    let token = form
        .token
        .take()
        .ok_or_else(|| AppError::Auth("Missing upload token".to_string()))?;
    state.tokens.verify(&token)?;

    let upload = form.into_complete()?;
    let received_at = Utc::now();

    let labels = if state.config.sanitize_labels() {
        upload.labels.sanitized()
    } else {
        if !upload.labels.is_filename_safe() {
            tracing::warn!(
                version = %upload.labels.version,
                sieve_fraction = %upload.labels.sieve_fraction,
                class = %upload.labels.class,
                "Labels contain characters outside [A-Za-z0-9_-]; using them verbatim"
            );
        }
        upload.labels
    };

    let comment = sanitize_comment(&upload.comment);
    let filename = build_filename(&labels, &comment, received_at);
    tracing::info!(
        filename = %filename,
        size = upload.photo.data.len(),
        client_content_type = ?upload.photo.content_type,
        "Accepted photo upload"
    );

    let photo = PhotoUpload {
        filename,
        labels,
        content_type: PHOTO_CONTENT_TYPE.to_string(),
        data: upload.photo.data,
    };
    state.dispatcher.dispatch(&photo).await?;
    Ok(())
}
