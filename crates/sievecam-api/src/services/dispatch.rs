//! Upload dispatcher
//!
//! Forwards an accepted photo to the file store and then to the training
//! intake. The second call only starts once the first has succeeded. Requests
//! the intake could never send are rejected before the store is written. There
//! is no rollback: a file created in the store stays there when the intake call
//! fails afterwards.

use std::sync::Arc;

use sievecam_core::{AppError, DownstreamService};
use sievecam_services::{DownstreamError, FileStore, PhotoUpload, StoredFile, TrainingIntake};

/// Outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub filename: String,
    pub stored_file: StoredFile,
}

/// Sequential two-sink upload pipeline: file store → training intake
#[derive(Clone)]
pub struct UploadDispatcher {
    file_store: Arc<dyn FileStore>,
    intake: Arc<dyn TrainingIntake>,
}

impl UploadDispatcher {
    pub fn new(file_store: Arc<dyn FileStore>, intake: Arc<dyn TrainingIntake>) -> Self {
        Self { file_store, intake }
    }

    #[tracing::instrument(skip(self, upload), fields(
        filename = %upload.filename,
        size = upload.data.len()
    ))]
    pub async fn dispatch(&self, upload: &PhotoUpload) -> Result<DispatchReceipt, AppError> {
        self.intake
            .check(upload)
            .map_err(|e| downstream_error(DownstreamService::TrainingIntake, e))?;

        let stored_file = self
            .file_store
            .create_file(upload)
            .await
            .map_err(|e| downstream_error(DownstreamService::FileStore, e))?;

        if let Err(e) = self.intake.submit(upload).await {
            tracing::warn!(
                filename = %upload.filename,
                file_id = %stored_file.id,
                "Photo stored but training intake failed; file is not rolled back"
            );
            return Err(downstream_error(DownstreamService::TrainingIntake, e));
        }

        tracing::info!(file_id = %stored_file.id, "Photo dispatched to both services");
        Ok(DispatchReceipt {
            filename: upload.filename.clone(),
            stored_file,
        })
    }
}

fn downstream_error(service: DownstreamService, err: DownstreamError) -> AppError {
    match err {
        // Labels that cannot be carried in a request are a caller problem.
        DownstreamError::InvalidRequest(message) => AppError::Validation(message),
        other => AppError::Downstream {
            service,
            message: other.to_string(),
        },
    }
}
