//! Downstream abstraction traits
//!
//! `FileStore` and `TrainingIntake` are the two sinks every accepted photo is
//! written to, in that order.

use async_trait::async_trait;
use bytes::Bytes;
use sievecam_core::PhotoLabels;

use crate::error::DownstreamResult;

/// A photo ready to be forwarded: derived filename, labels and raw bytes.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub labels: PhotoLabels,
    pub content_type: String,
    pub data: Bytes,
}

/// A file created in the file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
}

/// Cloud file store that receives the original photo.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create a new file named `upload.filename` holding `upload.data`.
    async fn create_file(&self, upload: &PhotoUpload) -> DownstreamResult<StoredFile>;
}

/// Training-data intake that receives the photo with its labels.
#[async_trait]
pub trait TrainingIntake: Send + Sync {
    /// Reject an upload this intake could never send, without any network call.
    fn check(&self, _upload: &PhotoUpload) -> DownstreamResult<()> {
        Ok(())
    }

    /// Submit the photo bytes tagged with its labels and filename.
    async fn submit(&self, upload: &PhotoUpload) -> DownstreamResult<()>;
}
