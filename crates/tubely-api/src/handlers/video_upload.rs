use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadCoordinator;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Path, State,
    },
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use tubely_core::Video;

#[utoipa::path(
    put,
    path = "/videos/{id}",
    tag = "videos",
    params(
        ("id" = String, Path, description = "Video record ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "MP4 file in the `video` field"),
    responses(
        (status = 200, description = "Video stored under its aspect-ratio prefix and record updated", body = Video),
        (status = 400, description = "Invalid identifier, payload, or not an mp4", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential, or not the owner", body = ErrorResponse),
        (status = 404, description = "Video record not found", body = ErrorResponse),
        (status = 500, description = "Probe, storage, or record update failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    let video = UploadCoordinator::new(&state)
        .upload_video(&id, &headers, multipart)
        .await?;

    Ok(Json(video))
}
