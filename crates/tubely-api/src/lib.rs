//! Tubely API Library
//!
//! This crate provides the HTTP handlers, the upload coordinator, and
//! application setup for the upload ingestion service.

// Module declarations
mod api_doc;
mod handlers;
mod services;
pub mod setup;
pub mod telemetry;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::UploadCoordinator;
