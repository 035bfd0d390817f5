//! Constants shared across crates.

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Thumbnail ceiling (10 MiB).
pub const MAX_THUMBNAIL_SIZE_MB: u64 = 10;

/// Video ceiling (1 GiB).
pub const MAX_VIDEO_SIZE_MB: u64 = 1024;

pub const THUMBNAIL_FIELD: &str = "thumbnail";
pub const VIDEO_FIELD: &str = "video";

/// The only media type accepted on the video path.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Issuer claim carried by access tokens.
pub const JWT_ISSUER: &str = "tubely-access";

pub const STAGING_FILE_PREFIX: &str = "tubely-upload-";
pub const STAGING_FILE_SUFFIX: &str = ".mp4";

pub const DEFAULT_PORT: u16 = 8091;
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
