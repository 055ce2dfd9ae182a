//! Google Drive file store authenticated with a service account.
//!
//! Every upload performs the OAuth2 JWT-bearer flow: an RS256 assertion signed
//! with the service-account key is exchanged at the key's `token_uri` for a
//! short-lived access token, which then authorizes a single multipart upload
//! into the configured folder.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::error::{status_error, DownstreamError, DownstreamResult};
use crate::traits::{FileStore, PhotoUpload, StoredFile};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account JSON key that the upload flow uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse a service-account JSON document.
    pub fn from_json(json: &str) -> DownstreamResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            DownstreamError::InvalidCredentials(format!(
                "service account JSON could not be parsed: {}",
                e
            ))
        })?;
        if key.client_email.trim().is_empty() {
            return Err(DownstreamError::InvalidCredentials(
                "service account JSON has an empty client_email".to_string(),
            ));
        }
        if key.private_key.trim().is_empty() {
            return Err(DownstreamError::InvalidCredentials(
                "service account JSON has an empty private_key".to_string(),
            ));
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Google Drive v3 file store
pub struct GoogleDriveStore {
    http_client: reqwest::Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    folder_id: String,
    upload_base_url: String,
    scope: String,
}

impl Debug for GoogleDriveStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GoogleDriveStore")
            .field("client_email", &self.key.client_email)
            .field("folder_id", &self.folder_id)
            .field("upload_base_url", &self.upload_base_url)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl GoogleDriveStore {
    /// Create a store writing into `folder_id`.
    ///
    /// Fails when the service-account private key is not a usable RSA PEM key.
    pub fn new(
        key: ServiceAccountKey,
        folder_id: impl Into<String>,
        upload_base_url: impl Into<String>,
        scope: impl Into<String>,
    ) -> DownstreamResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            DownstreamError::InvalidCredentials(format!(
                "service account private key is not a valid RSA PEM key: {}",
                e
            ))
        })?;

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("sievecam/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            key,
            signing_key,
            folder_id: folder_id.into(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            scope: scope.into(),
        })
    }

    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    /// Signed JWT-bearer assertion for the token endpoint.
    fn signed_assertion(&self) -> DownstreamResult<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.signing_key).map_err(|e| {
            DownstreamError::InvalidCredentials(format!("failed to sign assertion: {}", e))
        })
    }

    /// Exchange a fresh assertion for a short-lived access token.
    #[tracing::instrument(skip(self), fields(token_uri = %self.key.token_uri))]
    pub async fn access_token(&self) -> DownstreamResult<String> {
        let assertion = self.signed_assertion()?;

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            return Err(DownstreamError::TokenExchange(err.to_string()));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            DownstreamError::TokenExchange(format!("unexpected token response: {}", e))
        })?;
        tracing::debug!(expires_in = ?token.expires_in, "Obtained Drive access token");
        Ok(token.access_token)
    }

    fn multipart_related_body(&self, upload: &PhotoUpload, boundary: &str) -> Vec<u8> {
        let metadata = json!({
            "name": upload.filename,
            "parents": [self.folder_id],
        });

        let mut body = Vec::with_capacity(upload.data.len() + 512);
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
                boundary, metadata
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Type: {}\r\n\r\n",
                boundary, upload.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&upload.data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        body
    }
}

#[async_trait]
impl FileStore for GoogleDriveStore {
    #[tracing::instrument(skip(self, upload), fields(
        drive.folder = %self.folder_id,
        drive.filename = %upload.filename,
        drive.size = upload.data.len()
    ))]
    async fn create_file(&self, upload: &PhotoUpload) -> DownstreamResult<StoredFile> {
        let start = std::time::Instant::now();
        let access_token = self.access_token().await?;

        let boundary = format!("sievecam-{}", uuid::Uuid::new_v4().simple());
        let body = self.multipart_related_body(upload, &boundary);
        let url = format!(
            "{}/upload/drive/v3/files?uploadType=multipart&fields=id,name",
            self.upload_base_url
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            tracing::error!(error = %err, "Drive upload failed");
            return Err(err);
        }

        let created: CreatedFile = response.json().await?;
        tracing::info!(
            file_id = %created.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Drive upload successful"
        );
        Ok(StoredFile {
            name: created.name.unwrap_or_else(|| upload.filename.clone()),
            id: created.id,
        })
    }
}
