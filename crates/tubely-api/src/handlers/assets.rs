//! Asset retrieval: resolves the URLs the local and memory backends hand out.

use crate::error::HttpAppError;
use crate::state::MediaState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use tubely_core::{AppError, AssetKind};
use tubely_storage::keys::memory_key;
use uuid::Uuid;

async fn stream_asset(media: &MediaState, locator: &str) -> Result<Response, HttpAppError> {
    let (content_type, stream) = media.storage.download_stream(locator).await.map_err(|e| {
        tracing::debug!(error = %e, locator = %locator, "Asset lookup failed");
        HttpAppError::from(e)
    })?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_str())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })
}

/// Serve an asset by its storage locator.
#[tracing::instrument(skip(media), fields(operation = "get_asset"))]
pub async fn get_asset(
    State(media): State<MediaState>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    stream_asset(&media, &key).await
}

async fn get_memory_asset(
    media: &MediaState,
    kind: AssetKind,
    raw_record_id: &str,
) -> Result<Response, HttpAppError> {
    let record_id = Uuid::parse_str(raw_record_id).map_err(AppError::from)?;
    stream_asset(media, &memory_key(kind, record_id)).await
}

/// Serve the memory-table thumbnail of a record.
#[tracing::instrument(skip(media), fields(operation = "get_thumbnail"))]
pub async fn get_thumbnail(
    State(media): State<MediaState>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    get_memory_asset(&media, AssetKind::Thumbnail, &id).await
}

/// Serve the memory-table video of a record.
#[tracing::instrument(skip(media), fields(operation = "get_video_asset"))]
pub async fn get_video(
    State(media): State<MediaState>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    get_memory_asset(&media, AssetKind::Video, &id).await
}
