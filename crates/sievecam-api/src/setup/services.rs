//! Downstream client initialization and application state setup

use anyhow::{Context, Result};
use sievecam_core::Config;
use sievecam_services::{GoogleDriveStore, RoboflowIntake, ServiceAccountKey};
use std::sync::Arc;

use crate::state::AppState;

/// Build the Drive and Roboflow clients and the shared application state
pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let key = ServiceAccountKey::from_json(config.google_service_account_json())
        .context("Failed to parse GOOGLE_SERVICE_ACCOUNT_JSON")?;
    let client_email = key.client_email.clone();

    let file_store = GoogleDriveStore::new(
        key,
        config.drive_folder(),
        config.drive_upload_url(),
        config.drive_scope(),
    )
    .context("Failed to initialize Google Drive file store")?;
    tracing::info!(
        client_email = %client_email,
        folder = %file_store.folder_id(),
        scope = %config.drive_scope(),
        "Google Drive file store initialized"
    );

    let intake = RoboflowIntake::new(config.roboflow_upload_url(), config.roboflow_key())
        .context("Failed to initialize Roboflow intake")?;
    tracing::info!(
        upload_url = %config.roboflow_upload_url(),
        "Roboflow intake initialized"
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        Arc::new(file_store),
        Arc::new(intake),
    )))
}
