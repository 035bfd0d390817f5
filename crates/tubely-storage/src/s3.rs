use crate::keys;
use crate::traits::{
    ByteStream, Payload, Storage, StorageError, StorageResult, StoreRequest, StoredObject,
};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, GetResult, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an already-built object store (used with `InMemory` in tests).
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        }
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn content_type_attributes(content_type: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        attributes
    }

    /// Content type recorded with the object, or implied by its key.
    fn content_type_of(result: &GetResult, key: &str) -> String {
        match result.attributes.get(&Attribute::ContentType) {
            Some(value) => {
                let content_type: &str = value.as_ref();
                content_type.to_string()
            }
            None => keys::content_type_for(key),
        }
    }

    /// Stream a reader through a multipart-capable writer. Small bodies end up
    /// as a single PUT; large ones as a multipart upload that is aborted on
    /// failure so no partial object becomes visible.
    async fn put_reader(
        &self,
        location: Path,
        attributes: Attributes,
        mut reader: std::pin::Pin<Box<dyn tokio::io::AsyncRead + Send + Unpin>>,
    ) -> StorageResult<u64> {
        let mut writer =
            BufWriter::new(Arc::clone(&self.store), location).with_attributes(attributes);

        let copied = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(size) => writer.shutdown().await.map(|_| size),
            Err(e) => Err(e),
        };

        match copied {
            Ok(size) => Ok(size),
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(error = %abort_err, "Failed to abort S3 multipart upload");
                }
                Err(StorageError::UploadFailed(e.to_string()))
            }
        }
    }

    async fn get_object(&self, key: &str) -> StorageResult<GetResult> {
        keys::validate_key(key)?;
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    #[tracing::instrument(skip(self, request), fields(
        storage.backend = "s3",
        record_id = %request.record_id,
        kind = %request.kind
    ))]
    async fn store(&self, request: StoreRequest) -> StorageResult<StoredObject> {
        let key = keys::object_key(request.key_prefix.as_deref(), &request.content_type);
        let location = Path::from(key.clone());
        let attributes = Self::content_type_attributes(&request.content_type);
        let start = std::time::Instant::now();

        let result = match request.payload {
            Payload::Bytes(bytes) => {
                let size = bytes.len() as u64;
                let opts = PutOptions {
                    attributes,
                    ..Default::default()
                };
                let put: ObjectResult<_> = self
                    .store
                    .put_opts(&location, PutPayload::from(bytes), opts)
                    .await;
                put.map(|_| size)
                    .map_err(|e| StorageError::UploadFailed(e.to_string()))
            }
            Payload::Reader(reader) => self.put_reader(location, attributes, reader).await,
        };

        let size = result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            e
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredObject { locator: key, url })
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<(String, ByteStream)> {
        let start = std::time::Instant::now();
        let result = self.get_object(storage_key).await?;
        let content_type = Self::content_type_of(&result, storage_key);

        let bucket = self.bucket.clone();
        let key = storage_key.to_string();

        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok((content_type, Box::pin(stream)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
