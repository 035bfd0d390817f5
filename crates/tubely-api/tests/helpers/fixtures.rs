//! Test fixtures: multipart forms, payload blobs, a fake prober, and
//! collaborators that fail on demand.

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tubely_core::{AppError, AssetKind, StorageBackend, Video};
use tubely_db::{InMemoryVideoStore, VideoStore};
use tubely_processing::{ProbeError, VideoDimensions, VideoProber};
use tubely_storage::{ByteStream, Storage, StorageError, StorageResult, StoreRequest, StoredObject};
use uuid::Uuid;

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Bytes standing in for an MP4. Only the fake prober ever looks at them.
pub fn create_test_video(size: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.extend((0..size.saturating_sub(data.len())).map(|i| (i % 251) as u8));
    data
}

/// A form with one file part.
pub fn file_form(field: &str, file_name: &str, mime_type: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(data).file_name(file_name).mime_type(mime_type);
    MultipartForm::new().add_part(field, part)
}

/// Prober that returns canned dimensions and records what it was shown.
pub struct FakeProber {
    result: Result<VideoDimensions, String>,
    seen_sizes: Mutex<Vec<u64>>,
    thumbnail_during_probe: Option<(Arc<InMemoryVideoStore>, Uuid, String)>,
}

impl FakeProber {
    pub fn dimensions(width: u32, height: u32) -> Self {
        Self {
            result: Ok(VideoDimensions { width, height }),
            seen_sizes: Mutex::new(Vec::new()),
            thumbnail_during_probe: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            seen_sizes: Mutex::new(Vec::new()),
            thumbnail_during_probe: None,
        }
    }

    /// While probing, set the record's thumbnail URL the way a parallel
    /// thumbnail upload would.
    pub fn with_thumbnail_during_probe(
        mut self,
        videos: Arc<InMemoryVideoStore>,
        record_id: Uuid,
        url: &str,
    ) -> Self {
        self.thumbnail_during_probe = Some((videos, record_id, url.to_string()));
        self
    }

    /// Size of the staged file at each probe, in call order.
    pub fn seen_sizes(&self) -> Vec<u64> {
        self.seen_sizes.lock().expect("prober lock poisoned").clone()
    }
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<VideoDimensions, ProbeError> {
        let size = std::fs::metadata(path)
            .map_err(|e| ProbeError::ProbeFailed(e.to_string()))?
            .len();
        self.seen_sizes
            .lock()
            .expect("prober lock poisoned")
            .push(size);

        if let Some((videos, record_id, url)) = &self.thumbnail_during_probe {
            videos
                .set_asset_url(*record_id, AssetKind::Thumbnail, url)
                .await
                .map_err(|e| ProbeError::ProbeFailed(e.to_string()))?;
        }

        self.result.clone().map_err(ProbeError::ProbeFailed)
    }
}

/// Backend that rejects every write.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn store(&self, _request: StoreRequest) -> StorageResult<StoredObject> {
        Err(StorageError::UploadFailed(
            "/var/lib/tubely/bucket: connection reset".to_string(),
        ))
    }

    async fn download_stream(&self, locator: &str) -> StorageResult<(String, ByteStream)> {
        Err(StorageError::NotFound(locator.to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Record store that reads through to an in-memory store and fails every
/// URL write.
pub struct FailingUpdates {
    inner: Arc<InMemoryVideoStore>,
}

impl FailingUpdates {
    pub fn new(inner: Arc<InMemoryVideoStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl VideoStore for FailingUpdates {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        self.inner.get_video(id).await
    }

    async fn set_asset_url(
        &self,
        id: Uuid,
        _kind: AssetKind,
        _url: &str,
    ) -> Result<Video, AppError> {
        Err(AppError::RecordUpdateFailed(format!("video {} update rejected", id)))
    }
}
