//! Multipart form extraction for photo uploads

use axum::extract::Multipart;
use bytes::Bytes;
use sievecam_core::{AppError, PhotoLabels};

pub const PHOTO_FIELD: &str = "photo";
pub const TOKEN_FIELD: &str = "token";
pub const VERSION_FIELD: &str = "version";
pub const SIEVE_FRACTION_FIELD: &str = "sievefraction";
pub const CLASS_FIELD: &str = "class";
pub const COMMENT_FIELD: &str = "comment";

/// The photo part of an upload form.
#[derive(Debug, Clone)]
pub struct PhotoPart {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// All fields of an upload form as received. Presence is checked by the
/// caller so that the token can be verified before anything else.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub token: Option<String>,
    pub version: Option<String>,
    pub sieve_fraction: Option<String>,
    pub class: Option<String>,
    pub comment: Option<String>,
    pub photo: Option<PhotoPart>,
}

/// A form whose required fields are all present.
#[derive(Debug)]
pub struct CompleteUpload {
    pub labels: PhotoLabels,
    pub comment: String,
    pub photo: PhotoPart,
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("Missing field '{}'", field))
}

fn set_once<T>(slot: &mut Option<T>, field: &str, value: T) -> Result<(), AppError> {
    if slot.is_some() {
        return Err(AppError::Validation(format!(
            "Field '{}' was sent more than once",
            field
        )));
    }
    *slot = Some(value);
    Ok(())
}

impl UploadForm {
    /// Check that every required field is present. A zero-byte photo is accepted.
    pub fn into_complete(self) -> Result<CompleteUpload, AppError> {
        let version = self.version.ok_or_else(|| missing(VERSION_FIELD))?;
        let sieve_fraction = self
            .sieve_fraction
            .ok_or_else(|| missing(SIEVE_FRACTION_FIELD))?;
        let class = self.class.ok_or_else(|| missing(CLASS_FIELD))?;
        let comment = self.comment.ok_or_else(|| missing(COMMENT_FIELD))?;
        let photo = self.photo.ok_or_else(|| missing(PHOTO_FIELD))?;

        Ok(CompleteUpload {
            labels: PhotoLabels {
                version,
                sieve_fraction,
                class,
            },
            comment,
            photo,
        })
    }
}

/// Read every part of an upload form. Unknown fields are ignored; repeated
/// known fields are rejected.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == PHOTO_FIELD {
            let content_type = field.content_type().map(|s: &str| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read photo data: {}", e)))?;
            set_once(&mut form.photo, PHOTO_FIELD, PhotoPart { data, content_type })?;
            continue;
        }

        let slot = match field_name.as_str() {
            TOKEN_FIELD => &mut form.token,
            VERSION_FIELD => &mut form.version,
            SIEVE_FRACTION_FIELD => &mut form.sieve_fraction,
            CLASS_FIELD => &mut form.class,
            COMMENT_FIELD => &mut form.comment,
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
                continue;
            }
        };
        let value = field.text().await.map_err(|e| {
            AppError::Validation(format!("Failed to read field '{}': {}", field_name, e))
        })?;
        set_once(slot, &field_name, value)?;
    }

    Ok(form)
}
