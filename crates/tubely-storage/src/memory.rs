use crate::keys;
use crate::traits::{
    ByteStream, Storage, StorageError, StorageResult, StoreRequest, StoredAsset, StoredObject,
};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process storage keyed by `{kind}/{record_id}`.
///
/// Entries live only as long as the process. A second upload for the same
/// record and kind replaces the first. Assets are served by the API under
/// `{base_url}/api/{locator}`.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, StoredAsset>>>,
    base_url: String,
}

impl MemoryStorage {
    /// # Arguments
    /// * `base_url` - Public origin of the API (e.g., "http://localhost:8091")
    pub fn new(base_url: impl Into<String>) -> Self {
        MemoryStorage {
            entries: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    fn generate_url(&self, locator: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), locator)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    #[tracing::instrument(skip(self, request), fields(
        storage.backend = "memory",
        record_id = %request.record_id,
        kind = %request.kind
    ))]
    async fn store(&self, request: StoreRequest) -> StorageResult<StoredObject> {
        let locator = keys::memory_key(request.kind, request.record_id);
        let data = request.payload.into_bytes().await?;
        let size = data.len();

        let replaced = self
            .entries
            .write()
            .await
            .insert(
                locator.clone(),
                StoredAsset {
                    data,
                    content_type: request.content_type,
                },
            )
            .is_some();

        tracing::info!(
            key = %locator,
            size_bytes = size,
            replaced,
            "Memory storage upload successful"
        );

        Ok(StoredObject {
            url: self.generate_url(&locator),
            locator,
        })
    }

    async fn download_stream(&self, locator: &str) -> StorageResult<(String, ByteStream)> {
        keys::validate_key(locator)?;
        let StoredAsset { data, content_type } = self
            .entries
            .read()
            .await
            .get(locator)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))?;

        let stream = futures::stream::once(async move { Ok::<_, StorageError>(data) });
        Ok((content_type, Box::pin(stream)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
