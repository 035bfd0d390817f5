//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: records live in `InMemoryVideoStore`, the
//! prober is a fake, and the S3 variant is backed by `object_store`'s
//! `InMemory`. No Docker or ffprobe required.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use futures::StreamExt;
use object_store::memory::InMemory;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtValidator;
use tubely_api::setup::routes;
use tubely_api::state::{AppState, MediaState, RecordState, SecurityState, UploadLimits};
use tubely_core::constants::{BYTES_PER_MB, MAX_THUMBNAIL_SIZE_MB, MAX_VIDEO_SIZE_MB};
use tubely_core::{BaseConfig, Config, LogFormat, StorageBackend, UploadConfig, Video};
use tubely_db::{InMemoryVideoStore, VideoStore};
use tubely_processing::GeometryClassifier;
use tubely_storage::{LocalStorage, MemoryStorage, S3Storage, Storage};
use uuid::Uuid;

pub use fixtures::{FailingStorage, FailingUpdates, FakeProber};

pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";
pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_REGION: &str = "us-east-1";

/// Public URL prefix of objects in the fake S3 bucket.
pub fn s3_url_prefix() -> String {
    format!("https://{}.s3.{}.amazonaws.com/", TEST_BUCKET, TEST_REGION)
}

/// Test application: server plus handles on every injected collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoStore>,
    pub storage: Arc<dyn Storage>,
    pub prober: Arc<FakeProber>,
    pub assets_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a record owned by `owner` and return it.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::new(owner, "Boots", "A video about boots");
        self.videos.insert(video.clone()).await;
        video
    }

    pub async fn fetch_video(&self, id: Uuid) -> Video {
        self.videos
            .get_video(id)
            .await
            .expect("record store failed")
            .expect("record disappeared")
    }

    /// Visible files under the assets root (sidecars and partials excluded).
    pub fn assets_files(&self) -> Vec<String> {
        dir_entries(self.assets_dir.path())
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect()
    }

    /// Content type and bytes of a stored asset, read back through the backend.
    pub async fn read_stored(&self, locator: &str) -> (String, Vec<u8>) {
        let (content_type, mut stream) = self
            .storage
            .download_stream(locator)
            .await
            .expect("stored asset should be readable");
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk.expect("Failed to read asset chunk"));
        }
        (content_type, data)
    }

    pub fn staging_files(&self) -> Vec<String> {
        dir_entries(self.staging_dir.path())
    }
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

pub struct TestAppBuilder {
    backend: StorageBackend,
    prober: FakeProber,
    max_thumbnail_bytes: u64,
    max_video_bytes: u64,
    videos: Option<Arc<InMemoryVideoStore>>,
    storage: Option<Arc<dyn Storage>>,
    failing_record_updates: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            prober: FakeProber::dimensions(1280, 720),
            max_thumbnail_bytes: MAX_THUMBNAIL_SIZE_MB * BYTES_PER_MB,
            max_video_bytes: MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
            videos: None,
            storage: None,
            failing_record_updates: false,
        }
    }
}

impl TestAppBuilder {
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn prober(mut self, prober: FakeProber) -> Self {
        self.prober = prober;
        self
    }

    pub fn max_thumbnail_bytes(mut self, limit: u64) -> Self {
        self.max_thumbnail_bytes = limit;
        self
    }

    pub fn max_video_bytes(mut self, limit: u64) -> Self {
        self.max_video_bytes = limit;
        self
    }

    /// Share a record store the test already holds (e.g. with a prober).
    pub fn videos(mut self, videos: Arc<InMemoryVideoStore>) -> Self {
        self.videos = Some(videos);
        self
    }

    /// Replace the backend picked by `backend()`.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Reads work, every URL write fails.
    pub fn failing_record_updates(mut self) -> Self {
        self.failing_record_updates = true;
        self
    }

    pub async fn build(self) -> TestApp {
        let assets_dir = TempDir::new().expect("Failed to create assets dir");
        let staging_dir = TempDir::new().expect("Failed to create staging dir");

        let config = Config(Box::new(UploadConfig {
            base: BaseConfig {
                server_port: 8091,
                environment: "test".to_string(),
                cors_origins: vec!["*".to_string()],
                jwt_secret: auth::TEST_JWT_SECRET.to_string(),
                db_max_connections: 5,
                db_timeout_seconds: 30,
                log_format: LogFormat::Compact,
            },
            database_url: None,
            storage_backend: self.backend,
            assets_root: assets_dir.path().to_path_buf(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
            s3_bucket: Some(TEST_BUCKET.to_string()),
            s3_region: Some(TEST_REGION.to_string()),
            s3_endpoint: None,
            aws_region: None,
            max_thumbnail_size_bytes: self.max_thumbnail_bytes,
            max_video_size_bytes: self.max_video_bytes,
            ffprobe_path: "ffprobe".to_string(),
            probe_timeout_secs: 5,
            staging_dir: Some(staging_dir.path().to_path_buf()),
        }));

        let storage: Arc<dyn Storage> = match (self.storage, self.backend) {
            (Some(storage), _) => storage,
            (None, StorageBackend::Local) => Arc::new(
                LocalStorage::new(config.assets_root(), config.assets_base_url())
                    .await
                    .expect("Failed to create local storage"),
            ),
            (None, StorageBackend::Memory) => {
                Arc::new(MemoryStorage::new(config.public_base_url()))
            }
            (None, StorageBackend::S3) => Arc::new(S3Storage::with_store(
                Arc::new(InMemory::new()),
                TEST_BUCKET.to_string(),
                TEST_REGION.to_string(),
                None,
            )),
        };

        let videos = self
            .videos
            .unwrap_or_else(|| Arc::new(InMemoryVideoStore::new()));
        let record_store: Arc<dyn VideoStore> = if self.failing_record_updates {
            Arc::new(FailingUpdates::new(videos.clone()))
        } else {
            videos.clone()
        };
        let prober = Arc::new(self.prober);

        let state = Arc::new(AppState {
            records: RecordState {
                videos: record_store,
            },
            media: MediaState {
                storage: storage.clone(),
                classifier: GeometryClassifier::new(prober.clone()),
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

        let app = routes::setup_routes(&config, state).expect("Failed to build routes");
        let server =
            TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp {
            server,
            videos,
            storage,
            prober,
            assets_dir,
            staging_dir,
        }
    }
}
