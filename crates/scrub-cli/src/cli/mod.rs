//! CLI for m3u-scrub.

mod run;

use clap::Parser;
use scrub_core::config::ScrubConfig;
use scrub_core::playlist;
use std::path::PathBuf;

pub use run::run;

/// Top-level CLI: `m3u-scrub <input> [output]`.
#[derive(Debug, Parser)]
#[command(name = "m3u-scrub", version)]
#[command(
    about = "Remove MP4 download entries from an M3U playlist, keeping live streams",
    long_about = None
)]
pub struct Cli {
    /// M3U playlist to check.
    pub input: PathBuf,

    /// Where to write the filtered playlist (default: <input>_clean.<ext>).
    pub output: Option<PathBuf>,

    /// Never run the deep probe, even if the tool is installed.
    #[arg(long)]
    pub no_deep_probe: bool,

    /// Let the deep probe decide octet-stream responses instead of accepting them.
    #[arg(long)]
    pub defer_octet_stream: bool,

    /// Media inspection tool used for the deep probe (default: ffprobe).
    #[arg(long, value_name = "PATH")]
    pub probe_tool: Option<String>,

    /// Read configuration from this file instead of ~/.config/m3u-scrub/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse process arguments. Usage errors exit with status 1; `--help` and
    /// `--version` exit 0.
    pub fn parse_or_exit() -> Self {
        match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) if e.use_stderr() => {
                let _ = e.print();
                std::process::exit(1);
            }
            Err(e) => e.exit(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| playlist::default_output_path(&self.input))
    }

    /// Command-line flags win over the config file.
    pub fn apply_to(&self, cfg: &mut ScrubConfig) {
        if self.no_deep_probe {
            cfg.deep_probe = false;
        }
        if self.defer_octet_stream {
            cfg.defer_octet_stream = true;
        }
        if let Some(tool) = &self.probe_tool {
            cfg.probe_tool = tool.clone();
        }
    }
}
