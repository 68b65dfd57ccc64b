//! Content-type sets and the no-deep-probe fallback.

use super::StageOutcome;

/// Sentinel content type when the HEAD request fails or sends none.
pub const UNKNOWN: &str = "unknown";

/// Types that mean a progressive MP4/QuickTime download.
pub const REJECT_TYPES: [&str; 6] = [
    "video/mp4",
    "video/x-mp4",
    "video/quicktime",
    "application/mp4",
    "audio/mp4",
    "audio/x-mp4",
];

/// Types served by HLS, MPEG-TS and raw stream endpoints.
pub const ACCEPT_TYPES: [&str; 9] = [
    "video/mp2t",
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
    "audio/mpeg",
    "video/mpeg",
    "application/octet-stream",
    "binary/octet-stream",
    "video/h264",
];

/// Generic binary types that MP4 servers also send.
const OCTET_STREAM_TYPES: [&str; 2] = ["application/octet-stream", "binary/octet-stream"];

/// Types an origin sends with error or login pages.
const ERROR_PAGE_TYPES: [&str; 2] = ["text/html", "text/plain"];

/// Decide on the reported content type. Matching is case-insensitive substring
/// matching, so parameters such as `; charset=utf-8` do not matter.
///
/// With `defer_octet_stream`, octet-stream types are left undecided so a
/// deep probe can look inside them.
pub fn check_content_type(content_type: &str, defer_octet_stream: bool) -> StageOutcome {
    let ct = content_type.to_ascii_lowercase();
    if let Some(t) = REJECT_TYPES.iter().find(|t| ct.contains(*t)) {
        return StageOutcome::Reject(format!("content type {t} is MP4"));
    }
    if defer_octet_stream && OCTET_STREAM_TYPES.iter().any(|t| ct.contains(t)) {
        return StageOutcome::Undecided;
    }
    if let Some(t) = ACCEPT_TYPES.iter().find(|t| ct.contains(*t)) {
        return StageOutcome::Accept(format!("streaming content type {t}"));
    }
    StageOutcome::Undecided
}

/// Final word when no deep probe is available: reject anything that looks
/// like an error page or says nothing, accept the rest.
pub fn fallback(content_type: &str) -> StageOutcome {
    let ct = content_type.trim().to_ascii_lowercase();
    if ERROR_PAGE_TYPES.iter().any(|t| ct.contains(t)) {
        return StageOutcome::Reject(format!("content type {ct}: likely an error page"));
    }
    if ct.is_empty() || ct == UNKNOWN {
        return StageOutcome::Reject("unknown content type".to_string());
    }
    StageOutcome::Accept(format!("content type {ct}: unknown but not MP4"))
}
