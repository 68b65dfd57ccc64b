//! Single forward scan over a playlist file.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{is_header, ChannelEntry, METADATA_PREFIX};
use crate::error::ScrubError;

const BOM: char = '\u{feff}';

/// Lazily yields [`ChannelEntry`] records after validating the header line.
///
/// Lines are decoded lossily so one bad byte does not abort a run. A trailing
/// `#EXTINF` with no URL line before EOF is dropped.
pub struct PlaylistReader<R> {
    header: String,
    lines: io::Split<R>,
    path: PathBuf,
}

impl PlaylistReader<BufReader<File>> {
    /// Open `path`, failing with `NotFound` or `Format` before any entry is read.
    pub fn open(path: &Path) -> Result<Self, ScrubError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScrubError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ScrubError::io(path, e),
        })?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: BufRead> PlaylistReader<R> {
    /// Wrap any buffered reader; `path` is only used in error messages.
    pub fn from_reader(reader: R, path: &Path) -> Result<Self, ScrubError> {
        let mut lines = reader.split(b'\n');
        let first = match lines.next() {
            Some(line) => decode(line.map_err(|e| ScrubError::io(path, e))?),
            None => String::new(),
        };
        let unmarked = first.trim_start_matches(BOM);
        if !is_header(unmarked) {
            return Err(ScrubError::Format {
                path: path.to_path_buf(),
                first_line: unmarked.to_string(),
            });
        }
        let header = first;
        tracing::debug!(path = %path.display(), %header, "playlist header ok");
        Ok(Self {
            header,
            lines,
            path: path.to_path_buf(),
        })
    }

    /// The header line as found, byte order mark included.
    ///
    /// Only the line ending is removed; the writer ends every line with `\n`.
    pub fn header(&self) -> &str {
        &self.header
    }

    fn next_line(&mut self) -> Option<Result<String, ScrubError>> {
        let path = &self.path;
        self.lines
            .next()
            .map(|r| r.map(decode).map_err(|e| ScrubError::io(path, e)))
    }
}

impl<R: BufRead> Iterator for PlaylistReader<R> {
    type Item = Result<ChannelEntry, ScrubError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.next_line()? {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            if !line.starts_with(METADATA_PREFIX) {
                continue;
            }
            return match self.next_line() {
                None => {
                    tracing::debug!(metadata = %line, "metadata line without URL at EOF, dropped");
                    None
                }
                Some(Err(e)) => Some(Err(e)),
                Some(Ok(url)) => Some(Ok(ChannelEntry::new(line, url.trim()))),
            };
        }
    }
}

/// Bytes of one line to text, without the line ending.
fn decode(bytes: Vec<u8>) -> String {
    let s = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    s.trim_end_matches(['\r', '\n']).to_string()
}
