//! Error types module
//!
//! Every failure the upload pipeline can produce is a variant of `AppError`.
//! Each variant self-describes how it is presented over HTTP through
//! `ErrorMetadata`; the API crate only renders what this table says.
//!
//! The `Database` variant wraps `sqlx::Error` when the `sqlx` feature is on.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;
use uuid::Uuid;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_OWNER")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the caller
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid record identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),

    #[error("Caller {caller_id} does not own record {record_id}")]
    NotOwner { record_id: Uuid, caller_id: Uuid },

    #[error("Payload exceeds {limit_bytes} bytes")]
    PayloadTooLarge { limit_bytes: u64 },

    #[error("Malformed multipart payload: {0}")]
    MalformedPayload(String),

    #[error("Multipart field '{0}' is missing")]
    FieldMissing(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Geometry classification failed: {0}")]
    ClassificationFailed(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Record update failed: {0}")]
    RecordUpdateFailed(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidIdentifier(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidIdentifier(_) => (
            400,
            "INVALID_IDENTIFIER",
            false,
            Some("Use the record's UUID in the request path"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingCredential(_) => (
            401,
            "MISSING_CREDENTIAL",
            false,
            Some("Send an 'Authorization: Bearer <token>' header"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidCredential(_) => (
            401,
            "INVALID_CREDENTIAL",
            false,
            Some("Log in again to obtain a fresh token"),
            false,
            LogLevel::Debug,
        ),
        AppError::RecordNotFound(_) => (
            404,
            "RECORD_NOT_FOUND",
            false,
            Some("Verify the record ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotOwner { .. } => (
            401,
            "NOT_OWNER",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            400,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedPayload(_) => (
            400,
            "MALFORMED_PAYLOAD",
            false,
            Some("Send the file as multipart/form-data"),
            false,
            LogLevel::Debug,
        ),
        AppError::FieldMissing(_) => (
            400,
            "FIELD_MISSING",
            false,
            Some("Check the multipart field name"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            400,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Check the declared content type of the file part"),
            false,
            LogLevel::Debug,
        ),
        AppError::ClassificationFailed(_) => (
            500,
            "CLASSIFICATION_FAILED",
            false,
            Some("Check that the file is a playable MP4"),
            true,
            LogLevel::Error,
        ),
        AppError::StorageWriteFailed(_) => (
            500,
            "STORAGE_WRITE_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::RecordUpdateFailed(_) => (
            500,
            "RECORD_UPDATE_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::AssetNotFound(_) => (
            404,
            "ASSET_NOT_FOUND",
            false,
            Some("Verify the asset URL"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidIdentifier(_) => "InvalidIdentifier",
            AppError::MissingCredential(_) => "MissingCredential",
            AppError::InvalidCredential(_) => "InvalidCredential",
            AppError::RecordNotFound(_) => "RecordNotFound",
            AppError::NotOwner { .. } => "NotOwner",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::MalformedPayload(_) => "MalformedPayload",
            AppError::FieldMissing(_) => "FieldMissing",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::ClassificationFailed(_) => "ClassificationFailed",
            AppError::StorageWriteFailed(_) => "StorageWriteFailed",
            AppError::RecordUpdateFailed(_) => "RecordUpdateFailed",
            AppError::AssetNotFound(_) => "AssetNotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidIdentifier(_) => "Invalid ID".to_string(),
            AppError::MissingCredential(_) => "Couldn't find JWT".to_string(),
            AppError::InvalidCredential(_) => "Couldn't validate JWT".to_string(),
            AppError::RecordNotFound(_) => "Video not found".to_string(),
            AppError::NotOwner { .. } => "You do not own this video".to_string(),
            AppError::PayloadTooLarge { limit_bytes } => format!(
                "File exceeds the maximum allowed size of {} MB",
                limit_bytes / 1024 / 1024
            ),
            AppError::MalformedPayload(_) => "Error parsing form".to_string(),
            AppError::FieldMissing(field) => format!("No {} found", field),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::ClassificationFailed(_) => {
                "Could not get aspect ratio for video".to_string()
            }
            AppError::StorageWriteFailed(_) => "Error saving file".to_string(),
            AppError::RecordUpdateFailed(_) => "Error updating video".to_string(),
            AppError::AssetNotFound(_) => "Asset not found".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
