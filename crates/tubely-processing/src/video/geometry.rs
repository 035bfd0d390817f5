//! Aspect ratio bucketing for uploaded videos.

use super::probe::{ProbeError, VideoProber};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Absolute tolerance applied to `width / height`.
pub const ASPECT_TOLERANCE: f64 = 0.02;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Landscape,
    Portrait,
    Other,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Other => "other",
        }
    }

    /// Storage key namespace for this bucket.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape/",
            AspectRatio::Portrait => "portrait/",
            AspectRatio::Other => "other/",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= ASPECT_TOLERANCE
}

/// Bucket raw dimensions. Zero width or height is `Other`.
pub fn classify(width: u32, height: u32) -> AspectRatio {
    if width == 0 || height == 0 {
        return AspectRatio::Other;
    }

    let ratio = f64::from(width) / f64::from(height);
    if almost_equal(ratio, LANDSCAPE_RATIO) {
        AspectRatio::Landscape
    } else if almost_equal(ratio, PORTRAIT_RATIO) {
        AspectRatio::Portrait
    } else {
        AspectRatio::Other
    }
}

/// Probes a staged file and buckets its geometry.
#[derive(Clone)]
pub struct GeometryClassifier {
    prober: Arc<dyn VideoProber>,
}

impl GeometryClassifier {
    pub fn new(prober: Arc<dyn VideoProber>) -> Self {
        Self { prober }
    }

    pub async fn classify(&self, path: &Path) -> Result<AspectRatio, ProbeError> {
        let dimensions = self.prober.probe(path).await?;
        let ratio = classify(dimensions.width, dimensions.height);

        tracing::info!(
            width = dimensions.width,
            height = dimensions.height,
            aspect_ratio = %ratio,
            "Classified video geometry"
        );

        Ok(ratio)
    }
}
