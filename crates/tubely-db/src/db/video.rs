use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::{AppError, AssetKind, Video};
use uuid::Uuid;

/// Record store used by the upload pipeline.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// `Ok(None)` when no record has this id.
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Point the URL slot for `kind` at `url` and bump `updated_at`.
    ///
    /// Only that one column is written, so concurrent uploads of the other
    /// kind are never reverted. Returns the record as stored afterwards.
    async fn set_asset_url(&self, id: Uuid, kind: AssetKind, url: &str) -> Result<Video, AppError>;
}

/// PostgreSQL-backed record store
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row: Option<Video> =
            sqlx::query_as::<Postgres, Video>("SELECT * FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update", db.record_id = %id, kind = %kind))]
    async fn set_asset_url(&self, id: Uuid, kind: AssetKind, url: &str) -> Result<Video, AppError> {
        let query = match kind {
            AssetKind::Thumbnail => {
                r#"
                UPDATE videos
                SET thumbnail_url = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#
            }
            AssetKind::Video => {
                r#"
                UPDATE videos
                SET video_url = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#
            }
        };

        let row: Option<Video> = sqlx::query_as::<Postgres, Video>(query)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| AppError::RecordUpdateFailed(format!("video {} no longer exists", id)))
    }
}
