//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
#[cfg(test)]
use futures::StreamExt;
use std::fmt;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tubely_core::AssetKind;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked body of a stored asset.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Bytes handed to a backend: fully buffered, or a reader positioned at the
/// first byte (the rewound staging file on the video path).
pub enum Payload {
    Bytes(Bytes),
    Reader(Pin<Box<dyn AsyncRead + Send + Unpin>>),
}

impl Payload {
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Payload::Reader(Box::pin(reader))
    }

    /// Drain the payload into memory.
    pub async fn into_bytes(self) -> StorageResult<Bytes> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Reader(mut reader) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer).await.map_err(|e| {
                    StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
                })?;
                Ok(Bytes::from(buffer))
            }
        }
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(data))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Payload::Reader(_) => f.write_str("Reader"),
        }
    }
}

/// One asset to persist.
#[derive(Debug)]
pub struct StoreRequest {
    /// Owning record. Only the memory variant names the entry after it.
    pub record_id: Uuid,
    pub kind: AssetKind,
    /// Declared media type, kept as asset metadata.
    pub content_type: String,
    /// Optional key namespace (e.g. `landscape/`). Ignored by the flat local layout.
    pub key_prefix: Option<String>,
    pub payload: Payload,
}

/// A durably accepted asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-specific handle: filename, object key, or `{kind}/{record_id}`.
    pub locator: String,
    /// Retrieval URL derived from the locator.
    pub url: String,
}

/// A fully loaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub data: Bytes,
    pub content_type: String,
}

/// Storage abstraction trait
///
/// The upload coordinator is written against this trait only; which variant
/// is active is decided once at startup (see [`crate::create_storage`]).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a payload and return its locator and retrieval URL.
    ///
    /// Implementations must not return until the payload is committed from the
    /// backend's point of view; on any failure no locator is handed out.
    async fn store(&self, request: StoreRequest) -> StorageResult<StoredObject>;

    /// Download an asset as a stream, together with its declared content type
    async fn download_stream(&self, locator: &str) -> StorageResult<(String, ByteStream)>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Drain a stored asset into memory.
#[cfg(test)]
pub(crate) async fn read_stored(
    storage: &dyn Storage,
    locator: &str,
) -> StorageResult<(String, Vec<u8>)> {
    let (content_type, mut stream) = storage.download_stream(locator).await?;
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        data.extend_from_slice(&chunk?);
    }
    Ok((content_type, data))
}
