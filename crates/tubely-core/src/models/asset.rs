use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{THUMBNAIL_FIELD, VIDEO_FIELD};

/// The two asset slots an owning record exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Thumbnail,
    Video,
}

impl AssetKind {
    /// Path segment used by the upload and retrieval routes (`thumbnails`, `videos`).
    pub fn route_segment(&self) -> &'static str {
        match self {
            AssetKind::Thumbnail => "thumbnails",
            AssetKind::Video => "videos",
        }
    }

    /// Multipart field that carries the file.
    pub fn form_field(&self) -> &'static str {
        match self {
            AssetKind::Thumbnail => THUMBNAIL_FIELD,
            AssetKind::Video => VIDEO_FIELD,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Thumbnail => write!(f, "thumbnail"),
            AssetKind::Video => write!(f, "video"),
        }
    }
}
