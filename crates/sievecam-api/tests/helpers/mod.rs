//! Test helpers: an in-process server wired to recording downstream fakes.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use sievecam_api::setup::routes;
use sievecam_api::AppState;
use sievecam_core::Config;
use sievecam_services::{
    DownstreamError, DownstreamResult, FileStore, PhotoUpload, StoredFile, TrainingIntake,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

/// Minimal JPEG header bytes; the gateway never decodes the image.
pub const TEST_PHOTO: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00test-photo\xff\xd9";

/// File store fake that records every upload it receives.
#[derive(Default)]
pub struct RecordingFileStore {
    pub uploads: Mutex<Vec<PhotoUpload>>,
    pub fail: bool,
}

#[async_trait]
impl FileStore for RecordingFileStore {
    async fn create_file(&self, upload: &PhotoUpload) -> DownstreamResult<StoredFile> {
        self.uploads.lock().unwrap().push(upload.clone());
        if self.fail {
            return Err(DownstreamError::Status {
                status: 403,
                body: "insufficient permissions for folder".to_string(),
            });
        }
        Ok(StoredFile {
            id: format!("file-{}", self.uploads.lock().unwrap().len()),
            name: upload.filename.clone(),
        })
    }
}

/// Training intake fake that records every submission it receives.
#[derive(Default)]
pub struct RecordingIntake {
    pub uploads: Mutex<Vec<PhotoUpload>>,
    pub fail: bool,
}

#[async_trait]
impl TrainingIntake for RecordingIntake {
    async fn submit(&self, upload: &PhotoUpload) -> DownstreamResult<()> {
        self.uploads.lock().unwrap().push(upload.clone());
        if self.fail {
            return Err(DownstreamError::Status {
                status: 401,
                body: "invalid api key".to_string(),
            });
        }
        Ok(())
    }
}

pub struct TestApp {
    server: TestServer,
    pub state: Arc<AppState>,
    pub file_store: Arc<RecordingFileStore>,
    pub intake: Arc<RecordingIntake>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn stored(&self) -> Vec<PhotoUpload> {
        self.file_store.uploads.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<PhotoUpload> {
        self.intake.uploads.lock().unwrap().clone()
    }

    /// A token issued by this app's token service.
    pub fn token(&self) -> String {
        self.state.tokens.issue().expect("token issue")
    }
}

/// Builder for a test app; defaults to uniform error presentation and
/// succeeding downstream fakes.
#[derive(Default)]
pub struct TestAppBuilder {
    env: HashMap<&'static str, String>,
    fail_file_store: bool,
    fail_intake: bool,
}

impl TestAppBuilder {
    pub fn env(mut self, key: &'static str, value: &str) -> Self {
        self.env.insert(key, value.to_string());
        self
    }

    pub fn detailed_errors(self) -> Self {
        self.env("ERROR_RESPONSE_MODE", "detailed")
    }

    pub fn failing_file_store(mut self) -> Self {
        self.fail_file_store = true;
        self
    }

    pub fn failing_intake(mut self) -> Self {
        self.fail_intake = true;
        self
    }

    pub fn build(self) -> TestApp {
        let mut env = HashMap::from([
            ("JWT_SECRET", TEST_JWT_SECRET.to_string()),
            ("ROBOFLOW_KEY", "test-roboflow-key".to_string()),
            ("DRIVE_FOLDER", "test-folder".to_string()),
            (
                "GOOGLE_SERVICE_ACCOUNT_JSON",
                r#"{"client_email": "test@example.iam.gserviceaccount.com", "private_key": "unused"}"#
                    .to_string(),
            ),
            ("ENVIRONMENT", "test".to_string()),
            ("MAX_UPLOAD_SIZE_MB", "1".to_string()),
        ]);
        env.extend(self.env);
        let config =
            Config::from_source(|key| env.get(key).cloned()).expect("Failed to build test config");

        let file_store = Arc::new(RecordingFileStore {
            fail: self.fail_file_store,
            ..Default::default()
        });
        let intake = Arc::new(RecordingIntake {
            fail: self.fail_intake,
            ..Default::default()
        });
        let state = Arc::new(AppState::new(
            config.clone(),
            file_store.clone(),
            intake.clone(),
        ));

        let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
        let server =
            TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp {
            server,
            state,
            file_store,
            intake,
        }
    }
}

pub fn setup_test_app() -> TestApp {
    TestAppBuilder::default().build()
}

/// A complete upload form; tests drop or replace fields from here.
pub struct UploadFields {
    pub token: Option<String>,
    pub version: Option<String>,
    pub sieve_fraction: Option<String>,
    pub class: Option<String>,
    pub comment: Option<String>,
    pub photo: Option<Vec<u8>>,
}

impl UploadFields {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            version: Some("v2".to_string()),
            sieve_fraction: Some("3".to_string()),
            class: Some("walnut".to_string()),
            comment: Some("test run".to_string()),
            photo: Some(TEST_PHOTO.to_vec()),
        }
    }

    pub fn into_form(self) -> MultipartForm {
        let mut form = MultipartForm::new();
        for (name, value) in [
            ("token", self.token),
            ("version", self.version),
            ("sievefraction", self.sieve_fraction),
            ("class", self.class),
            ("comment", self.comment),
        ] {
            if let Some(value) = value {
                form = form.add_text(name, value);
            }
        }
        if let Some(photo) = self.photo {
            let part = Part::bytes(bytes::Bytes::from(photo))
                .file_name("photo.jpg")
                .mime_type("image/jpeg");
            form = form.add_part("photo", part);
        }
        form
    }
}
