//! Tubely record store
//!
//! Video records are looked up by id for the ownership check and written back
//! once an uploaded asset is durably stored.

pub mod db;

pub use db::{InMemoryVideoStore, VideoRepository, VideoStore};
