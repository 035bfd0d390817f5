//! Tubely media processing
//!
//! Currently a single concern: probing a staged video for its stream
//! dimensions and bucketing the aspect ratio for storage key prefixes.

pub mod video;

pub use video::{
    classify, AspectRatio, FfprobeProber, GeometryClassifier, ProbeError, VideoDimensions,
    VideoProber,
};
