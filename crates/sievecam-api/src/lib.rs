//! Sievecam API Library
//!
//! This crate provides the HTTP handlers, token service, upload dispatcher and
//! application setup for the photo intake gateway.

mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use auth::token::{TokenClaims, TokenService};
pub use error::{ErrorResponse, HttpAppError};
pub use services::dispatch::{DispatchReceipt, UploadDispatcher};
pub use state::AppState;
