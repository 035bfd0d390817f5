use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::AssetKind;

/// Owning record for uploaded assets.
///
/// The upload pipeline only ever changes `thumbnail_url`, `video_url` and
/// `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn asset_url(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Thumbnail => self.thumbnail_url.as_deref(),
            AssetKind::Video => self.video_url.as_deref(),
        }
    }

    /// Point the record's slot for `kind` at `url` and bump `updated_at`.
    pub fn set_asset_url(&mut self, kind: AssetKind, url: String) {
        match kind {
            AssetKind::Thumbnail => self.thumbnail_url = Some(url),
            AssetKind::Video => self.video_url = Some(url),
        }
        self.updated_at = Utc::now();
    }
}
