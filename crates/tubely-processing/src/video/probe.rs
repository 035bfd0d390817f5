//! Stream dimension probing via an external `ffprobe` process.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe failed: {0}")]
    ProbeFailed(String),

    #[error("no video streams found")]
    NoStreams,

    #[error("ffprobe timed out after {0:?}")]
    Timeout(Duration),
}

/// Width and height of the first video stream. Missing values read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

/// Reads stream dimensions from a local, seekable video file.
#[async_trait]
pub trait VideoProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<VideoDimensions, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoDimensions, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::ProbeFailed(format!("failed to parse ffprobe output: {}", e)))?;

    let stream = output
        .streams
        .into_iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or(ProbeError::NoStreams)?;

    Ok(VideoDimensions {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}

/// Runs the probing utility as a child process, killed if it outlives `timeout`.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VideoProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn probe(&self, path: &Path) -> Result<VideoDimensions, ProbeError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| {
                ProbeError::ProbeFailed(format!("failed to run {}: {}", self.ffprobe_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                status = %output.status,
                stderr = %stderr.trim(),
                "ffprobe exited with failure"
            );
            return Err(ProbeError::ProbeFailed(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        let dimensions = parse_probe_output(&output.stdout)?;

        tracing::debug!(
            width = dimensions.width,
            height = dimensions.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Probed video dimensions"
        );

        Ok(dimensions)
    }
}
