//! Sievecam Services Library
//!
//! Clients for the two downstream collaborators a photo is forwarded to:
//! a Google Drive folder (file store) and the Roboflow upload API (training
//! data intake). Both sit behind traits so the HTTP layer can swap them out.

pub mod drive;
pub mod error;
pub mod roboflow;
pub mod traits;

// Re-export commonly used types
pub use drive::{GoogleDriveStore, ServiceAccountKey};
pub use error::{DownstreamError, DownstreamResult};
pub use roboflow::RoboflowIntake;
pub use traits::{FileStore, PhotoUpload, StoredFile, TrainingIntake};
