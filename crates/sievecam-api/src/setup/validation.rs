//! Configuration validation
//!
//! Validates configuration at startup so misconfigurations fail before the
//! listener is bound.

use anyhow::{Context, Result};
use sievecam_core::{Config, ErrorPresentation};
use sievecam_services::ServiceAccountKey;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    ServiceAccountKey::from_json(config.google_service_account_json())
        .context("GOOGLE_SERVICE_ACCOUNT_JSON is not a usable service account key")?;

    if config.is_production() && config.error_presentation() == ErrorPresentation::Detailed {
        tracing::warn!(
            "ERROR_RESPONSE_MODE=detailed in production - status codes reveal why uploads fail"
        );
    }

    if !config.sanitize_labels() {
        tracing::debug!("SANITIZE_LABELS is off - labels are used verbatim in filenames");
    }

    Ok(())
}
