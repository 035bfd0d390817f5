//! Configuration module
//!
//! Process configuration is read once from the environment (and `.env`),
//! validated fail-fast, and handed to every layer as an immutable `Config`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    BYTES_PER_MB, DEFAULT_FFPROBE_PATH, DEFAULT_PORT, DEFAULT_PROBE_TIMEOUT_SECS,
    MAX_THUMBNAIL_SIZE_MB, MAX_VIDEO_SIZE_MB,
};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Settings every process needs regardless of storage strategy
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub log_format: LogFormat,
}

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub base: BaseConfig,
    /// When unset the service keeps records in process memory (development only).
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub assets_root: PathBuf,
    pub public_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub max_thumbnail_size_bytes: u64,
    pub max_video_size_bytes: u64,
    pub ffprobe_path: String,
    pub probe_timeout_secs: u64,
    pub staging_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadConfig>);

impl Config {
    fn as_upload(&self) -> &UploadConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_upload().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_upload().base.jwt_secret
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_upload().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_upload().base.db_timeout_seconds
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_upload().base.log_format
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_upload().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_upload().storage_backend
    }

    pub fn assets_root(&self) -> &std::path::Path {
        &self.as_upload().assets_root
    }

    pub fn public_base_url(&self) -> &str {
        self.as_upload().public_base_url.trim_end_matches('/')
    }

    /// Base URL local-filesystem assets are served under.
    pub fn assets_base_url(&self) -> String {
        format!("{}/assets", self.public_base_url())
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_upload().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_upload().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_upload().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_upload().aws_region.as_deref()
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.as_upload().max_thumbnail_size_bytes
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_upload().max_video_size_bytes
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_upload().ffprobe_path
    }

    pub fn probe_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.as_upload().probe_timeout_secs)
    }

    pub fn staging_dir(&self) -> Option<&std::path::Path> {
        self.as_upload().staging_dir.as_deref()
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match optional_var("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let base = BaseConfig {
            server_port,
            environment,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            log_format,
        };

        let storage_backend = match optional_var("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::default(),
        };

        let max_thumbnail_size_mb = env::var("MAX_THUMBNAIL_SIZE_MB")
            .unwrap_or_else(|_| MAX_THUMBNAIL_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_THUMBNAIL_SIZE_MB);

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let public_base_url = optional_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", server_port));

        Ok(UploadConfig {
            base,
            database_url: optional_var("DATABASE_URL"),
            storage_backend,
            assets_root: PathBuf::from(
                optional_var("ASSETS_ROOT").unwrap_or_else(|| "./assets".to_string()),
            ),
            public_base_url,
            s3_bucket: optional_var("S3_BUCKET"),
            s3_region: optional_var("S3_REGION"),
            s3_endpoint: optional_var("S3_ENDPOINT"),
            aws_region: optional_var("AWS_REGION"),
            max_thumbnail_size_bytes: max_thumbnail_size_mb * BYTES_PER_MB,
            max_video_size_bytes: max_video_size_mb * BYTES_PER_MB,
            ffprobe_path: optional_var("FFPROBE_PATH")
                .unwrap_or_else(|| DEFAULT_FFPROBE_PATH.to_string()),
            probe_timeout_secs: env::var("PROBE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_PROBE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
            staging_dir: optional_var("STAGING_DIR").map(PathBuf::from),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        match self.database_url.as_deref() {
            Some(url) if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) => {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
            None if is_production_env(&self.base.environment) => {
                return Err(anyhow::anyhow!("DATABASE_URL must be set in production"));
            }
            _ => {}
        }

        if self.max_thumbnail_size_bytes == 0 || self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_THUMBNAIL_SIZE_MB and MAX_VIDEO_SIZE_MB must be greater than zero"
            ));
        }

        if self.probe_timeout_secs == 0 {
            return Err(anyhow::anyhow!("PROBE_TIMEOUT_SECS must be greater than zero"));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() && self.aws_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        Ok(())
    }
}
