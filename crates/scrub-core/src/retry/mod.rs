//! Retry and backoff policy for the per-entry HTTP checks.
//!
//! Each check gets at most a small, fixed number of attempts. Only transient
//! failures (timeouts, connection errors, throttling, 5xx) are retried; a
//! definite answer such as 404 is returned on the first try.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::ProbeError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
