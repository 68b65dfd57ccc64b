//! Error type for a single HTTP check attempt.

use std::fmt;

/// Failure of one attempt at an HTTP check. Kept separate from anyhow so the
/// retry loop can classify it before the caller folds it into a verdict.
#[derive(Debug)]
pub enum ProbeError {
    /// Curl reported an error and no HTTP status was received.
    Curl(curl::Error),
    /// The server answered, but with a status worth retrying (408, 429, 5xx).
    Http(u32),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Curl(e) => write!(f, "{}", e),
            ProbeError::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Curl(e) => Some(e),
            ProbeError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        ProbeError::Curl(e)
    }
}
