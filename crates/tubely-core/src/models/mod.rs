//! Domain models

pub mod asset;
pub mod video;

pub use asset::AssetKind;
pub use video::Video;
