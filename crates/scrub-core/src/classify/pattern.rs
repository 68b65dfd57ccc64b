//! URL-pattern MP4 heuristic.

use super::StageOutcome;

/// Query fragments that name MP4 as the requested format.
const MP4_QUERY_MARKERS: [&str; 2] = ["format=mp4", "type=mp4"];

/// Rejects URLs whose text alone says "MP4"; everything else is undecided.
pub fn check_url_pattern(url: &str) -> StageOutcome {
    if looks_like_mp4(url) {
        StageOutcome::Reject("URL pattern indicates MP4".to_string())
    } else {
        StageOutcome::Undecided
    }
}

/// Case-insensitive test for `.mp4` ending a path (end, `?` or `&` after it),
/// an `/mp4/` path segment, or an MP4 format/type query parameter.
pub fn looks_like_mp4(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    has_mp4_extension(&lower)
        || lower.contains("/mp4/")
        || MP4_QUERY_MARKERS.iter().any(|m| lower.contains(m))
}

fn has_mp4_extension(lower: &str) -> bool {
    lower.match_indices(".mp4").any(|(i, m)| {
        matches!(
            lower[i + m.len()..].chars().next(),
            None | Some('?') | Some('&')
        )
    })
}
