//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`. Every collaborator is injected here once at
//! startup (or by the test harness); nothing is a module-level singleton.

use crate::auth::CredentialValidator;
use std::path::PathBuf;
use std::sync::Arc;
use tubely_core::AssetKind;
use tubely_db::VideoStore;
use tubely_processing::GeometryClassifier;
use tubely_storage::Storage;

// ----- Sub-state types -----

/// Owning-record store.
#[derive(Clone)]
pub struct RecordState {
    pub videos: Arc<dyn VideoStore>,
}

/// Per-kind payload ceilings in bytes.
#[derive(Clone, Copy, Debug)]
pub struct UploadLimits {
    pub max_thumbnail_bytes: u64,
    pub max_video_bytes: u64,
}

impl UploadLimits {
    pub fn for_kind(&self, kind: AssetKind) -> u64 {
        match kind {
            AssetKind::Thumbnail => self.max_thumbnail_bytes,
            AssetKind::Video => self.max_video_bytes,
        }
    }
}

/// Storage backend, geometry classifier, and staging settings.
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub classifier: GeometryClassifier,
    pub limits: UploadLimits,
    /// `None` stages in the OS temp dir.
    pub staging_dir: Option<PathBuf>,
}

#[derive(Clone)]
pub struct SecurityState {
    pub credentials: Arc<dyn CredentialValidator>,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordState,
    pub media: MediaState,
    pub security: SecurityState,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for RecordState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.records.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for MediaState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for SecurityState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.security.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
