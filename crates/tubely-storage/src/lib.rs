//! Tubely Storage Library
//!
//! This crate provides the `Storage` trait and its three interchangeable
//! variants: local filesystem, in-process memory table, and S3.
//!
//! # Locator format
//!
//! - **Local**: `<name>.<ext>`, a flat file directly under the assets root.
//! - **Memory**: `{kind}/{record_id}`, e.g. `thumbnails/6f1c...`. One entry per
//!   record per asset kind; re-upload overwrites.
//! - **S3**: `[prefix]<name>.<ext>`, where the prefix is the video geometry
//!   bucket (`landscape/`, `portrait/`, `other/`).
//!
//! `<name>` is 32 random bytes, base64url-encoded without padding. Naming is
//! centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{
    ByteStream, Payload, Storage, StorageError, StorageResult, StoreRequest, StoredAsset,
    StoredObject,
};
pub use tubely_core::StorageBackend;
