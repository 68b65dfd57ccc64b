pub mod config;
pub mod logging;

pub mod classify;
pub mod error;
pub mod fetch_head;
pub mod media_probe;
pub mod playlist;
pub mod report;
pub mod retry;
pub mod scrub;

pub use error::ScrubError;
