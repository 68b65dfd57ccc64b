//! Fatal errors that abort a run before or during playlist processing.
//!
//! Per-entry network problems are not errors: they are folded into a REJECT
//! verdict by the classifier and never reach this type.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScrubError {
    /// Input playlist does not exist.
    #[error("input file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// First line is not an `#EXTM3U` header.
    #[error("{} is not an M3U playlist (first line: {:?})", .path.display(), .first_line)]
    Format { path: PathBuf, first_line: String },

    /// A required external capability is missing (e.g. libcurl without HTTP).
    #[error("missing dependency: {0}")]
    Dependency(String),

    /// Reading the input or writing the output failed.
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrubError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrubError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_mentions_first_line() {
        let e = ScrubError::Format {
            path: PathBuf::from("list.m3u"),
            first_line: "#EXTINF:-1,foo".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("list.m3u"));
        assert!(msg.contains("#EXTINF:-1,foo"));
    }

    #[test]
    fn io_error_keeps_source() {
        let e = ScrubError::io(
            "out.m3u",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(std::error::Error::source(&e).is_some());
    }
}
