//! M3U playlist model: header, `#EXTINF` + URL entries, and output naming.
//!
//! Only the two-line convention is understood: a metadata line starting with
//! `#EXTINF` followed by the URL line. Everything else between entries is
//! skipped.

mod reader;
mod writer;

pub use reader::PlaylistReader;
pub use writer::PlaylistWriter;

use std::path::{Path, PathBuf};

/// Required prefix of the first line.
pub const HEADER_PREFIX: &str = "#EXTM3U";

/// Prefix of an entry's metadata line.
pub const METADATA_PREFIX: &str = "#EXTINF";

/// Display name used when the metadata line has nothing after its last comma.
pub const UNKNOWN_CHANNEL: &str = "unknown channel";

/// Suffix inserted before the extension for the default output path.
const CLEAN_SUFFIX: &str = "_clean";

/// One playlist entry: the raw `#EXTINF` line and the URL line after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub metadata: String,
    pub url: String,
}

impl ChannelEntry {
    pub fn new(metadata: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            metadata: metadata.into(),
            url: url.into(),
        }
    }

    /// Text after the last comma of the metadata line, trimmed.
    pub fn display_name(&self) -> &str {
        let name = self
            .metadata
            .rsplit_once(',')
            .map(|(_, name)| name.trim())
            .unwrap_or("");
        if name.is_empty() {
            UNKNOWN_CHANNEL
        } else {
            name
        }
    }
}

/// True when `line` (BOM and trailing whitespace already stripped) opens an M3U file.
pub fn is_header(line: &str) -> bool {
    line.starts_with(HEADER_PREFIX)
}

/// `list.m3u` → `list_clean.m3u`, `list` → `list_clean`, kept in the same directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{CLEAN_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{CLEAN_SUFFIX}"),
    };
    input.with_file_name(name)
}
