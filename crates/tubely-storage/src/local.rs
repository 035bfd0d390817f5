use crate::keys;
use crate::traits::{
    ByteStream, Payload, Storage, StorageError, StorageResult, StoreRequest, StoredObject,
};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Assets are flat files named `<random>.<ext>` directly under `base_path`.
/// The declared content type is kept in a hidden `.<name>.meta` sidecar.
/// Writes land in hidden `.partial` siblings first; the sidecar is renamed into
/// place before the asset, so a returned locator always names a complete file
/// with its content type.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for assets (e.g., "./assets")
    /// * `base_url` - Base URL the root is served under (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a locator to a filesystem path.
    ///
    /// The layout is flat: anything with a separator, a parent reference or a
    /// leading dot (partial files, sidecars) is rejected.
    fn key_to_path(&self, locator: &str) -> StorageResult<PathBuf> {
        keys::validate_key(locator)?;
        if locator.contains('/') || locator.starts_with('.') {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }
        Ok(self.base_path.join(locator))
    }

    /// Generate public URL for file
    fn generate_url(&self, locator: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), locator)
    }

    fn partial_path(&self, locator: &str) -> PathBuf {
        self.base_path.join(format!(".{}.partial", locator))
    }

    fn meta_path(&self, locator: &str) -> PathBuf {
        self.base_path.join(format!(".{}.meta", locator))
    }

    fn meta_partial_path(&self, locator: &str) -> PathBuf {
        self.base_path.join(format!(".{}.meta.partial", locator))
    }

    async fn write_payload(path: &Path, payload: Payload) -> StorageResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let size = match payload {
            Payload::Bytes(data) => {
                file.write_all(&data).await.map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to write file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                data.len() as u64
            }
            Payload::Reader(mut reader) => {
                tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to write stream to file {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        };

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(size)
    }

    async fn move_into_place(from: &Path, to: &Path) -> StorageResult<()> {
        fs::rename(from, to).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to move {} into place: {}", to.display(), e))
        })
    }

    /// Write the payload and its sidecar, then publish both.
    async fn commit(&self, locator: &str, request: StoreRequest) -> StorageResult<u64> {
        let path = self.key_to_path(locator)?;
        let partial = self.partial_path(locator);
        let meta_partial = self.meta_partial_path(locator);

        let size = Self::write_payload(&partial, request.payload).await?;
        Self::write_payload(&meta_partial, Payload::from(request.content_type.into_bytes()))
            .await?;

        Self::move_into_place(&meta_partial, &self.meta_path(locator)).await?;
        Self::move_into_place(&partial, &path).await?;

        Ok(size)
    }

    /// Declared content type from the sidecar. Assets without one fall back to
    /// their extension.
    async fn read_content_type(&self, locator: &str) -> StorageResult<String> {
        let meta = self.meta_path(locator);
        match fs::read_to_string(&meta).await {
            Ok(content_type) => Ok(content_type.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(keys::content_type_for(locator)),
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read metadata {}: {}",
                meta.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[tracing::instrument(skip(self, request), fields(
        storage.backend = "local",
        record_id = %request.record_id,
        kind = %request.kind
    ))]
    async fn store(&self, request: StoreRequest) -> StorageResult<StoredObject> {
        let locator = keys::asset_filename(&request.content_type);
        let start = std::time::Instant::now();

        let size = match self.commit(&locator, request).await {
            Ok(size) => size,
            Err(e) => {
                for leftover in [
                    self.partial_path(&locator),
                    self.meta_partial_path(&locator),
                    self.meta_path(&locator),
                ] {
                    let _ = fs::remove_file(&leftover).await;
                }
                tracing::error!(
                    error = %e,
                    key = %locator,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage upload failed"
                );
                return Err(e);
            }
        };

        let url = self.generate_url(&locator);

        tracing::info!(
            key = %locator,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject { locator, url })
    }

    async fn download_stream(&self, locator: &str) -> StorageResult<(String, ByteStream)> {
        let path = self.key_to_path(locator)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(locator.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let content_type = self.read_content_type(locator).await?;

        let key = locator.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(error = %e, key = %key, "Local storage stream download error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok((content_type, Box::pin(stream)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
