use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::{AppError, AssetKind, Video};
use uuid::Uuid;

use super::video::VideoStore;

/// Process-local record store. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id, video);
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn set_asset_url(&self, id: Uuid, kind: AssetKind, url: &str) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&id) {
            Some(existing) => {
                existing.set_asset_url(kind, url.to_string());
                Ok(existing.clone())
            }
            None => Err(AppError::RecordUpdateFailed(format!(
                "video {} no longer exists",
                id
            ))),
        }
    }
}
