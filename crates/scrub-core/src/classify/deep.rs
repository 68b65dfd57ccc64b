//! Decisions from deep-probe (ffprobe) metadata.

use super::StageOutcome;
use crate::media_probe::{FormatInfo, StreamInfo};

/// Container names that mark a live streaming transport.
const STREAMING_FORMATS: [&str; 3] = ["mpegts", "hls", "m3u8"];

/// Reject when the container itself is MP4. Undecided otherwise, so the
/// stream metadata gets a look.
pub fn check_format(format: &FormatInfo) -> StageOutcome {
    let name = format.format_name.to_ascii_lowercase();
    if name.contains("mp4") {
        return StageOutcome::Reject(format!("deep probe: container {name} is MP4"));
    }
    if format.filename.to_ascii_lowercase().ends_with(".mp4") {
        return StageOutcome::Reject("deep probe: file name ends in .mp4".to_string());
    }
    StageOutcome::Undecided
}

/// Final deep-probe decision from the codecs. H.264 video with AAC audio is the
/// typical MP4 pairing, so it is only kept inside a streaming container.
pub fn check_streams(format: &FormatInfo, streams: &[StreamInfo]) -> StageOutcome {
    let has_codec = |kind: &str, codec: &str| {
        streams.iter().any(|s| {
            s.codec_type.eq_ignore_ascii_case(kind) && s.codec_name.eq_ignore_ascii_case(codec)
        })
    };

    if has_codec("video", "h264") && has_codec("audio", "aac") {
        let name = format.format_name.to_ascii_lowercase();
        if STREAMING_FORMATS.iter().any(|f| name.contains(f)) {
            return StageOutcome::Accept(format!("deep probe: h264/aac in {name}"));
        }
        return StageOutcome::Reject(
            "deep probe: h264/aac outside a streaming container, likely MP4".to_string(),
        );
    }

    StageOutcome::Accept("deep probe found no MP4 signature".to_string())
}
