//! Application state shared by all handlers.
//!
//! Built once at startup and never mutated afterwards.

use crate::auth::token::TokenService;
use crate::error::HttpAppError;
use crate::services::dispatch::UploadDispatcher;
use sievecam_core::{AppError, Config};
use sievecam_services::{FileStore, TrainingIntake};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub dispatcher: UploadDispatcher,
}

impl AppState {
    pub fn new(
        config: Config,
        file_store: Arc<dyn FileStore>,
        intake: Arc<dyn TrainingIntake>,
    ) -> Self {
        let tokens = TokenService::new(config.jwt_secret(), config.token_ttl_secs());
        Self {
            tokens,
            dispatcher: UploadDispatcher::new(file_store, intake),
            config,
        }
    }

    /// Wrap an error with this deployment's presentation settings.
    pub fn http_error(&self, error: AppError) -> HttpAppError {
        HttpAppError::new(
            error,
            self.config.error_presentation(),
            self.config.is_production(),
        )
    }
}
