//! Sievecam Core Library
//!
//! This crate provides configuration, the error taxonomy, and the filename
//! derivation rules shared by the sievecam services and HTTP API.

pub mod config;
pub mod error;
pub mod naming;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ErrorPresentation, GatewayConfig};
pub use error::{AppError, DownstreamService, ErrorMetadata, LogLevel};
pub use naming::{
    build_filename, filename_timestamp, is_filename_safe, sanitize_comment, PhotoLabels,
};
