//! Roboflow upload API client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::error::{status_error, DownstreamError, DownstreamResult};
use crate::traits::{PhotoUpload, TrainingIntake};

pub const TAG_HEADER: &str = "x-roboflow-tag";
pub const CLASS_HEADER: &str = "x-roboflow-class";
pub const FILENAME_HEADER: &str = "x-roboflow-filename";

/// Training-data intake backed by a Roboflow project upload endpoint.
///
/// The photo is sent as a raw `application/octet-stream` body; labels travel in
/// headers. The tag is `<sievefraction>,<version>`.
pub struct RoboflowIntake {
    http_client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

impl Debug for RoboflowIntake {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RoboflowIntake")
            .field("upload_url", &self.upload_url)
            .finish_non_exhaustive()
    }
}

impl RoboflowIntake {
    pub fn new(upload_url: impl Into<String>, api_key: impl Into<String>) -> DownstreamResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("sievecam/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            upload_url: upload_url.into(),
            api_key: api_key.into(),
        })
    }

    fn headers(&self, upload: &PhotoUpload) -> DownstreamResult<HeaderMap> {
        fn value(name: &str, raw: &str) -> DownstreamResult<HeaderValue> {
            HeaderValue::from_str(raw).map_err(|_| {
                DownstreamError::InvalidRequest(format!(
                    "value for {} cannot be sent as an HTTP header",
                    name
                ))
            })
        }

        let tag = format!(
            "{},{}",
            upload.labels.sieve_fraction, upload.labels.version
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        headers.insert(HeaderName::from_static(TAG_HEADER), value(TAG_HEADER, &tag)?);
        headers.insert(
            HeaderName::from_static(CLASS_HEADER),
            value(CLASS_HEADER, &upload.labels.class)?,
        );
        headers.insert(
            HeaderName::from_static(FILENAME_HEADER),
            value(FILENAME_HEADER, &upload.filename)?,
        );
        let mut auth = value(
            AUTHORIZATION.as_str(),
            &format!("Bearer {}", self.api_key),
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }
}

#[async_trait]
impl TrainingIntake for RoboflowIntake {
    fn check(&self, upload: &PhotoUpload) -> DownstreamResult<()> {
        self.headers(upload).map(|_| ())
    }

    #[tracing::instrument(skip(self, upload), fields(
        roboflow.filename = %upload.filename,
        roboflow.class = %upload.labels.class,
        roboflow.size = upload.data.len()
    ))]
    async fn submit(&self, upload: &PhotoUpload) -> DownstreamResult<()> {
        let start = std::time::Instant::now();
        let headers = self.headers(upload)?;

        let response = self
            .http_client
            .post(&self.upload_url)
            .headers(headers)
            .body(upload.data.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            tracing::error!(error = %err, "Roboflow upload failed");
            return Err(err);
        }

        let body = response.text().await.unwrap_or_default();
        let image_id = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from));
        tracing::info!(
            image_id = ?image_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Roboflow upload successful"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use sievecam_core::PhotoLabels;

    fn upload(class: &str) -> PhotoUpload {
        PhotoUpload {
            filename: "v2_3_walnut_c_2026-10-16T09-41-07Z.jpg".to_string(),
            labels: PhotoLabels {
                version: "v2".to_string(),
                sieve_fraction: "3".to_string(),
                class: class.to_string(),
            },
            content_type: "image/jpeg".to_string(),
            data: Bytes::from_static(b"jpeg"),
        }
    }

    #[test]
    fn headers_carry_labels() {
        let intake = RoboflowIntake::new("https://api.roboflow.com/p/p/5/upload", "key").unwrap();
        let headers = intake.headers(&upload("walnut")).unwrap();
        assert_eq!(headers[TAG_HEADER], "3,v2");
        assert_eq!(headers[CLASS_HEADER], "walnut");
        assert_eq!(
            headers[FILENAME_HEADER],
            "v2_3_walnut_c_2026-10-16T09-41-07Z.jpg"
        );
        assert_eq!(headers[AUTHORIZATION], "Bearer key");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");
    }

    #[test]
    fn control_characters_rejected() {
        let intake = RoboflowIntake::new("https://api.roboflow.com/p/p/5/upload", "key").unwrap();
        assert!(matches!(
            intake.headers(&upload("wal\nnut")),
            Err(DownstreamError::InvalidRequest(_))
        ));
    }

    #[test]
    fn check_matches_header_rules() {
        let intake = RoboflowIntake::new("https://api.roboflow.com/p/p/5/upload", "key").unwrap();
        assert!(intake.check(&upload("walnut")).is_ok());
        assert!(matches!(
            intake.check(&upload("wal\rnut")),
            Err(DownstreamError::InvalidRequest(_))
        ));
    }
}
