//! Output playlist with atomic finalize.
//!
//! Entries go to a `.part` temp file next to the destination. `finish` syncs
//! and renames it into place; dropping the writer before that (error,
//! interrupt) deletes the temp file and leaves the destination untouched.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::ChannelEntry;
use crate::error::ScrubError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

pub struct PlaylistWriter {
    out: BufWriter<NamedTempFile>,
    final_path: PathBuf,
    entries: usize,
}

impl PlaylistWriter {
    /// Create the temp file in the destination's directory and write `header`.
    pub fn create(final_path: &Path, header: &str) -> Result<Self, ScrubError> {
        let dir = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".m3u-scrub-").suffix(TEMP_SUFFIX);
        // Same mode a plain File::create would get, umask applied.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let tmp = builder
            .tempfile_in(dir)
            .map_err(|e| ScrubError::io(dir, e))?;
        tracing::debug!(temp = %tmp.path().display(), "output temp file created");

        let mut writer = Self {
            out: BufWriter::new(tmp),
            final_path: final_path.to_path_buf(),
            entries: 0,
        };
        writer.write_line(header)?;
        Ok(writer)
    }

    /// Append one accepted entry as its metadata line followed by its URL line.
    pub fn push(&mut self, entry: &ChannelEntry) -> Result<(), ScrubError> {
        self.write_line(&entry.metadata)?;
        self.write_line(&entry.url)?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        self.out.get_ref().path()
    }

    fn write_line(&mut self, line: &str) -> Result<(), ScrubError> {
        writeln!(self.out, "{line}").map_err(|e| ScrubError::io(&self.final_path, e))
    }

    /// Flush, sync and atomically rename the temp file to the destination.
    pub fn finish(self) -> Result<PathBuf, ScrubError> {
        let final_path = self.final_path;
        let tmp = self
            .out
            .into_inner()
            .map_err(|e| ScrubError::io(&final_path, e.into_error()))?;
        // A replaced playlist keeps its mode.
        if let Ok(meta) = std::fs::metadata(&final_path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| ScrubError::io(tmp.path(), e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| ScrubError::io(tmp.path(), e))?;
        tmp.persist(&final_path)
            .map_err(|e| ScrubError::io(&final_path, e.error))?;
        tracing::debug!(path = %final_path.display(), "output persisted");
        Ok(final_path)
    }
}
