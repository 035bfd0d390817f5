//! Database repositories for data access layer
//!
//! `VideoRepository` is the Postgres-backed store. `InMemoryVideoStore` keeps
//! records in process and is meant for local development and tests.

pub mod memory;
pub mod video;

pub use memory::InMemoryVideoStore;
pub use video::{VideoRepository, VideoStore};
