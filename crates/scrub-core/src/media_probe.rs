//! Deep probe through an external media inspection tool (ffprobe).
//!
//! The tool is optional. It is looked up once at startup with
//! [`FfprobeInspector::detect`]; a missing tool only disables the deep-probe
//! stage. Every invocation is bounded by a timeout and the child is killed
//! when it runs over.

use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::classify::MediaInspector;

/// Container-level metadata (`-show_format`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormatInfo {
    /// Comma-separated demuxer names, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    #[serde(default)]
    pub format_name: String,
    #[serde(default)]
    pub filename: String,
}

/// One elementary stream (`-show_streams`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub codec_type: String,
    #[serde(default)]
    pub codec_name: String,
}

#[derive(Deserialize)]
struct FormatOutput {
    format: Option<FormatInfo>,
}

#[derive(Deserialize)]
struct StreamsOutput {
    #[serde(default)]
    streams: Vec<StreamInfo>,
}

/// Parse `ffprobe -print_format json -show_format` output.
pub fn parse_format_json(data: &[u8]) -> Option<FormatInfo> {
    match serde_json::from_slice::<FormatOutput>(data) {
        Ok(out) => out.format,
        Err(e) => {
            tracing::debug!("unparseable ffprobe format output: {}", e);
            None
        }
    }
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_streams_json(data: &[u8]) -> Vec<StreamInfo> {
    match serde_json::from_slice::<StreamsOutput>(data) {
        Ok(out) => out.streams,
        Err(e) => {
            tracing::debug!("unparseable ffprobe streams output: {}", e);
            Vec::new()
        }
    }
}

/// Runs ffprobe (or a compatible tool) against stream URLs.
#[derive(Debug, Clone)]
pub struct FfprobeInspector {
    tool: String,
    timeout: Duration,
}

impl FfprobeInspector {
    /// Returns the inspector only when `<tool> -version` runs and succeeds
    /// within `timeout`.
    pub async fn detect(tool: &str, timeout: Duration) -> Option<Self> {
        let mut cmd = Command::new(tool);
        cmd.arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout, cmd.status()).await {
            Ok(Ok(status)) if status.success() => {
                tracing::debug!(tool, "deep probe tool available");
                Some(Self {
                    tool: tool.to_string(),
                    timeout,
                })
            }
            Ok(Ok(status)) => {
                tracing::warn!(tool, %status, "deep probe tool exited with failure");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(tool, "deep probe tool not available: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(tool, "deep probe tool timed out on -version");
                None
            }
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Run the tool with JSON output and return stdout, or None on failure or timeout.
    async fn run_json(&self, show: &str, url: &str) -> Option<Vec<u8>> {
        let mut cmd = Command::new(&self.tool);
        cmd.args(["-v", "quiet", "-print_format", "json", show, url])
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(out)) if out.status.success() => Some(out.stdout),
            Ok(Ok(out)) => {
                tracing::debug!(url, show, status = %out.status, "deep probe failed");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(url, "failed to run {}: {}", self.tool, e);
                None
            }
            Err(_) => {
                tracing::debug!(url, show, "deep probe timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

impl MediaInspector for FfprobeInspector {
    async fn format(&self, url: &str) -> Option<FormatInfo> {
        let out = self.run_json("-show_format", url).await?;
        parse_format_json(&out)
    }

    async fn streams(&self, url: &str) -> Vec<StreamInfo> {
        match self.run_json("-show_streams", url).await {
            Some(out) => parse_streams_json(&out),
            None => Vec::new(),
        }
    }
}
