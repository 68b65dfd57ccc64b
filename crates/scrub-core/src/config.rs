use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Global configuration loaded from `~/.config/m3u-scrub/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Total timeout for the reachability (status) check.
    pub status_timeout_secs: u64,
    /// Total timeout for the HEAD content-type check.
    pub content_type_timeout_secs: u64,
    /// Timeout for each ffprobe invocation.
    pub probe_timeout_secs: u64,
    /// TCP/TLS connect timeout shared by both HTTP checks.
    pub connect_timeout_secs: u64,
    /// Extra attempts after the first one for transient HTTP failures.
    pub http_retries: u32,
    /// Base delay between HTTP attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Media inspection tool used for the deep probe.
    pub probe_tool: String,
    /// Run the deep probe when the tool is available.
    pub deep_probe: bool,
    /// Let the deep probe decide generic octet-stream content types instead
    /// of accepting them at the content-type stage.
    pub defer_octet_stream: bool,
    /// Optional User-Agent sent with HTTP checks.
    pub user_agent: Option<String>,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            status_timeout_secs: 10,
            content_type_timeout_secs: 10,
            probe_timeout_secs: 15,
            connect_timeout_secs: 5,
            http_retries: 1,
            retry_delay_ms: 1000,
            probe_tool: "ffprobe".to_string(),
            deep_probe: true,
            defer_octet_stream: false,
            user_agent: None,
        }
    }
}

impl ScrubConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn content_type_timeout(&self) -> Duration {
        Duration::from_secs(self.content_type_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Retry policy for the HTTP checks: the first attempt plus `http_retries`.
    pub fn retry_policy(&self) -> RetryPolicy {
        let base = Duration::from_millis(self.retry_delay_ms);
        RetryPolicy {
            max_attempts: self.http_retries.saturating_add(1),
            base_delay: base,
            max_delay: base.saturating_mul(4),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("m3u-scrub")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScrubConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScrubConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<ScrubConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: ScrubConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
