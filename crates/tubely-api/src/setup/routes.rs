//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tubely_core::{AssetKind, Config};

/// Room for multipart boundaries and part headers on top of a file ceiling.
const MULTIPART_FRAMING_SLACK: u64 = 64 * 1024;

fn body_limit(file_limit: u64) -> DefaultBodyLimit {
    let limit = usize::try_from(file_limit.saturating_add(MULTIPART_FRAMING_SLACK))
        .unwrap_or(usize::MAX);
    DefaultBodyLimit::max(limit)
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let limits = state.media.limits;

    let upload_routes = Router::new()
        .route(
            "/thumbnails/{id}",
            put(handlers::thumbnail_upload::upload_thumbnail)
                .layer(body_limit(limits.for_kind(AssetKind::Thumbnail))),
        )
        .route(
            "/videos/{id}",
            put(handlers::video_upload::upload_video)
                .layer(body_limit(limits.for_kind(AssetKind::Video))),
        );

    let asset_routes = Router::new()
        .route("/assets/{*key}", get(handlers::assets::get_asset))
        .route("/api/thumbnails/{id}", get(handlers::assets::get_thumbnail))
        .route("/api/videos/{id}", get(handlers::assets::get_video));

    let app = upload_routes
        .merge(asset_routes)
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::PUT, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
