//! Upload ingestion: identify → authenticate → authorize → decode → validate →
//! stage → classify → store → publish.

mod coordinator;
mod multipart;
mod staging;

pub use coordinator::UploadCoordinator;
