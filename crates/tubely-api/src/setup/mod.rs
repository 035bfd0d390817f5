//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::JwtValidator;
use crate::state::{AppState, MediaState, RecordState, SecurityState, UploadLimits};
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_processing::{FfprobeProber, GeometryClassifier};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let videos = database::setup_records(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let prober = Arc::new(FfprobeProber::new(
        config.ffprobe_path(),
        config.probe_timeout(),
    ));

    let state = Arc::new(AppState {
        records: RecordState { videos },
        media: MediaState {
            storage,
            classifier: GeometryClassifier::new(prober),
            limits: UploadLimits {
                max_thumbnail_bytes: config.max_thumbnail_size_bytes(),
                max_video_bytes: config.max_video_size_bytes(),
            },
            staging_dir: config.staging_dir().map(|p| p.to_path_buf()),
        },
        security: SecurityState {
            credentials: Arc::new(JwtValidator::new(config.jwt_secret())),
        },
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
