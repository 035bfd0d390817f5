//! OpenAPI documentation for the upload routes.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::models;

struct BearerTokenAddon;

impl Modify for BearerTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely Upload API",
        version = "0.1.0",
        description = "Upload ingestion for video records: thumbnails (any image, 10 MiB) and MP4 videos (1 GiB) classified by aspect ratio. Uploads require a bearer token belonging to the record's owner."
    ),
    paths(
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::video_upload::upload_video,
    ),
    components(
        schemas(
            models::Video,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerTokenAddon),
    tags(
        (name = "thumbnails", description = "Thumbnail upload for video records"),
        (name = "videos", description = "Video upload with aspect-ratio classification")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
