//! Temporary on-disk copy of an inbound video.

use std::path::Path;
use tempfile::NamedTempFile;
use tubely_core::constants::{STAGING_FILE_PREFIX, STAGING_FILE_SUFFIX};
use tubely_core::AppError;

/// A uniquely named staging file, removed from disk when dropped.
///
/// Dropping happens on every exit path of the request that created it, so
/// staged payloads never outlive their request.
pub struct StagedUpload {
    temp: NamedTempFile,
}

impl StagedUpload {
    pub fn create(dir: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = tempfile::Builder::new();
        builder
            .prefix(STAGING_FILE_PREFIX)
            .suffix(STAGING_FILE_SUFFIX);

        let temp = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| AppError::Internal(format!("Could not create staging file: {}", e)))?;

        tracing::debug!(path = %temp.path().display(), "Created staging file");

        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// An independent read/write handle positioned at offset zero.
    pub fn open(&self) -> Result<tokio::fs::File, AppError> {
        let file = self
            .temp
            .reopen()
            .map_err(|e| AppError::Internal(format!("Could not open staging file: {}", e)))?;
        Ok(tokio::fs::File::from_std(file))
    }
}
