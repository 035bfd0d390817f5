//! Video geometry module

pub mod geometry;
pub mod probe;

pub use geometry::{classify, AspectRatio, GeometryClassifier, ASPECT_TOLERANCE};
pub use probe::{parse_probe_output, FfprobeProber, ProbeError, VideoDimensions, VideoProber};
