//! Upload coordinator
//!
//! Runs one upload end to end. The ordering is fixed: the record id is parsed,
//! the caller authenticated and ownership checked before a single payload byte
//! is read, and the record is only updated after the backend has durably
//! accepted the asset. A failure at any step leaves the record as it was.

use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::http::HeaderMap;
use bytes::Bytes;
use tokio::io::AsyncSeekExt;
use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::{AppError, AssetKind, Video};
use tubely_db::VideoStore;
use tubely_processing::GeometryClassifier;
use tubely_storage::{Payload, Storage, StoreRequest, StoredObject};
use uuid::Uuid;

use crate::auth::{bearer_token, CredentialValidator};
use crate::state::{AppState, UploadLimits};

use super::multipart::decode_file_field;
use super::staging::StagedUpload;

fn accept_image(content_type: &str) -> Result<(), AppError> {
    match content_type.parse::<mime::Mime>() {
        Ok(parsed) if parsed.type_() == mime::IMAGE => Ok(()),
        _ => Err(AppError::UnsupportedMediaType(format!(
            "Thumbnail must be an image, got {}",
            content_type
        ))),
    }
}

fn accept_mp4(content_type: &str) -> Result<(), AppError> {
    match content_type.parse::<mime::Mime>() {
        Ok(parsed) if parsed.essence_str() == VIDEO_CONTENT_TYPE => Ok(()),
        _ => Err(AppError::UnsupportedMediaType("File is not an mp4".to_string())),
    }
}

/// Upload coordinator
///
/// Holds the collaborators of one request. Built per request from `AppState`.
pub struct UploadCoordinator {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn Storage>,
    classifier: GeometryClassifier,
    credentials: Arc<dyn CredentialValidator>,
    limits: UploadLimits,
    staging_dir: Option<std::path::PathBuf>,
}

impl UploadCoordinator {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            videos: state.records.videos.clone(),
            storage: state.media.storage.clone(),
            classifier: state.media.classifier.clone(),
            credentials: state.security.credentials.clone(),
            limits: state.media.limits,
            staging_dir: state.media.staging_dir.clone(),
        }
    }

    /// Identify → authenticate → authorize.
    async fn authorize(
        &self,
        raw_record_id: &str,
        headers: &HeaderMap,
    ) -> Result<Video, AppError> {
        let record_id = Uuid::parse_str(raw_record_id)?;

        let token = bearer_token(headers)?;
        let caller_id = self.credentials.validate(token)?;

        let video = self
            .videos
            .get_video(record_id)
            .await?
            .ok_or(AppError::RecordNotFound(record_id))?;

        if !video.is_owned_by(caller_id) {
            return Err(AppError::NotOwner {
                record_id,
                caller_id,
            });
        }

        tracing::info!(record_id = %record_id, caller_id = %caller_id, "Upload authorized");

        Ok(video)
    }

    /// Point the record's slot for `kind` at the stored asset.
    async fn publish(
        &self,
        record_id: Uuid,
        kind: AssetKind,
        stored: StoredObject,
    ) -> Result<Video, AppError> {
        let video = self
            .videos
            .set_asset_url(record_id, kind, &stored.url)
            .await
            .map_err(|e| {
                // The stored asset stays behind unreferenced.
                tracing::warn!(
                    record_id = %record_id,
                    locator = %stored.locator,
                    error = %e,
                    "Record update failed after asset was stored"
                );
                match e {
                    AppError::RecordUpdateFailed(msg) => AppError::RecordUpdateFailed(msg),
                    other => AppError::RecordUpdateFailed(other.to_string()),
                }
            })?;

        tracing::info!(
            record_id = %record_id,
            kind = %kind,
            locator = %stored.locator,
            "Asset published"
        );

        Ok(video)
    }

    async fn store(&self, request: StoreRequest) -> Result<StoredObject, AppError> {
        self.storage
            .store(request)
            .await
            .map_err(|e| AppError::StorageWriteFailed(e.to_string()))
    }

    #[tracing::instrument(skip_all, fields(record_id = %raw_record_id))]
    pub async fn upload_thumbnail(
        &self,
        raw_record_id: &str,
        headers: &HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Video, AppError> {
        let video = self.authorize(raw_record_id, headers).await?;
        let mut multipart = multipart.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

        let limit = self.limits.for_kind(AssetKind::Thumbnail);
        let mut data: Vec<u8> = Vec::new();
        let decoded = decode_file_field(
            &mut multipart,
            AssetKind::Thumbnail.form_field(),
            limit,
            accept_image,
            &mut data,
        )
        .await?;

        let stored = self
            .store(StoreRequest {
                record_id: video.id,
                kind: AssetKind::Thumbnail,
                content_type: decoded.content_type,
                key_prefix: None,
                payload: Payload::Bytes(Bytes::from(data)),
            })
            .await?;

        self.publish(video.id, AssetKind::Thumbnail, stored).await
    }

    #[tracing::instrument(skip_all, fields(record_id = %raw_record_id))]
    pub async fn upload_video(
        &self,
        raw_record_id: &str,
        headers: &HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Video, AppError> {
        let video = self.authorize(raw_record_id, headers).await?;
        let mut multipart = multipart.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

        // Removed from disk when this function returns, on every path.
        let staged = StagedUpload::create(self.staging_dir.as_deref())?;
        let mut file = staged.open()?;

        let limit = self.limits.for_kind(AssetKind::Video);
        let decoded = decode_file_field(
            &mut multipart,
            AssetKind::Video.form_field(),
            limit,
            accept_mp4,
            &mut file,
        )
        .await?;

        let aspect_ratio = self
            .classifier
            .classify(staged.path())
            .await
            .map_err(|e| AppError::ClassificationFailed(e.to_string()))?;

        file.seek(std::io::SeekFrom::Start(0)).await?;

        let stored = self
            .store(StoreRequest {
                record_id: video.id,
                kind: AssetKind::Video,
                content_type: decoded.content_type,
                key_prefix: Some(aspect_ratio.key_prefix().to_string()),
                payload: Payload::from_reader(file),
            })
            .await?;

        tracing::info!(
            record_id = %video.id,
            size_bytes = decoded.size_bytes,
            aspect_ratio = %aspect_ratio,
            "Video stored"
        );

        self.publish(video.id, AssetKind::Video, stored).await
    }
}
