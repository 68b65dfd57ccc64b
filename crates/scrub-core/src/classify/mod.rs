//! Entry classification: decide whether a playlist URL is a stream to keep or
//! an MP4 download to drop.
//!
//! The decision is a chain of independent stages, run in order:
//!
//! 1. reachability: final HTTP status must be 2xx/3xx
//! 2. URL pattern: `.mp4`, `/mp4/`, `format=mp4`, `type=mp4`
//! 3. content type from a HEAD request
//! 4. deep probe with the media inspection tool, when available
//! 5. fallback on the content type when no deep probe is available
//!
//! Each stage returns [`StageOutcome`]; the first non-`Undecided` outcome wins.
//! Network failures are never errors here. They show up as status `0` or
//! content type `unknown` and end in a REJECT.

pub mod content_type;
pub mod deep;
pub mod pattern;

use std::fmt;
use std::future::Future;

use crate::media_probe::{FormatInfo, StreamInfo};

/// Final decision for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "ACCEPT"),
            Verdict::Reject => write!(f, "REJECT"),
        }
    }
}

/// Which stage produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Status,
    Pattern,
    ContentType,
    DeepProbe,
    Fallback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Status => "status",
            Stage::Pattern => "pattern",
            Stage::ContentType => "content-type",
            Stage::DeepProbe => "deep-probe",
            Stage::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// Result of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Accept(String),
    Reject(String),
    Undecided,
}

/// Verdict plus the stage and human-readable reason behind it. The reason is
/// only logged and printed, never written to the output playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub stage: Stage,
    pub reason: String,
}

impl Classification {
    fn from_outcome(stage: Stage, outcome: StageOutcome) -> Option<Self> {
        let (verdict, reason) = match outcome {
            StageOutcome::Accept(r) => (Verdict::Accept, r),
            StageOutcome::Reject(r) => (Verdict::Reject, r),
            StageOutcome::Undecided => return None,
        };
        tracing::debug!(%stage, %verdict, %reason, "stage decided");
        Some(Self {
            verdict,
            stage,
            reason,
        })
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }
}

/// Network side of classification. Implementations must not fail: a request
/// that cannot be completed reports status `0` or [`content_type::UNKNOWN`].
pub trait HttpInspector {
    /// Final HTTP status after redirects, `0` when nothing was received.
    fn status(&self, url: &str) -> impl Future<Output = u32> + Send;

    /// Lower-cased `Content-Type` of the final response, or `unknown`.
    fn content_type(&self, url: &str) -> impl Future<Output = String> + Send;
}

/// Deep-probe side of classification. `None`/empty means no usable metadata.
pub trait MediaInspector {
    fn format(&self, url: &str) -> impl Future<Output = Option<FormatInfo>> + Send;

    fn streams(&self, url: &str) -> impl Future<Output = Vec<StreamInfo>> + Send;
}

/// Stage 1: only 2xx and 3xx count as reachable.
pub fn check_status(code: u32) -> StageOutcome {
    if (200..400).contains(&code) {
        StageOutcome::Undecided
    } else {
        StageOutcome::Reject(format!("invalid status {code:03}"))
    }
}

/// Runs the stage chain for one URL.
///
/// `media` is the deep-probe capability: `Some` only when the tool was found
/// at startup.
pub struct Classifier<H, M> {
    http: H,
    media: Option<M>,
    defer_octet_stream: bool,
}

impl<H: HttpInspector, M: MediaInspector> Classifier<H, M> {
    pub fn new(http: H, media: Option<M>) -> Self {
        Self {
            http,
            media,
            defer_octet_stream: false,
        }
    }

    /// Leave octet-stream content types to the deep probe. Has no effect
    /// without a deep-probe capability.
    pub fn with_deferred_octet_stream(mut self, defer: bool) -> Self {
        self.defer_octet_stream = defer;
        self
    }

    pub fn has_deep_probe(&self) -> bool {
        self.media.is_some()
    }

    pub async fn classify(&self, url: &str) -> Classification {
        let url = url.trim();

        let code = if url.is_empty() {
            0
        } else {
            self.http.status(url).await
        };
        tracing::debug!(url, code, "status check");
        if let Some(c) = Classification::from_outcome(Stage::Status, check_status(code)) {
            return c;
        }

        if let Some(c) =
            Classification::from_outcome(Stage::Pattern, pattern::check_url_pattern(url))
        {
            return c;
        }

        let ct = self.http.content_type(url).await;
        tracing::debug!(url, content_type = %ct, "content type check");
        let defer = self.defer_octet_stream && self.has_deep_probe();
        if let Some(c) = Classification::from_outcome(
            Stage::ContentType,
            content_type::check_content_type(&ct, defer),
        ) {
            return c;
        }

        match &self.media {
            Some(media) => self.deep_probe(media, url).await,
            None => Classification::from_outcome(Stage::Fallback, content_type::fallback(&ct))
                .unwrap_or_else(|| Classification {
                    verdict: Verdict::Reject,
                    stage: Stage::Fallback,
                    reason: "undecided".to_string(),
                }),
        }
    }

    async fn deep_probe(&self, media: &M, url: &str) -> Classification {
        let format = media.format(url).await.unwrap_or_default();
        tracing::debug!(url, format_name = %format.format_name, "deep probe format");
        if let Some(c) = Classification::from_outcome(Stage::DeepProbe, deep::check_format(&format))
        {
            return c;
        }

        let streams = media.streams(url).await;
        tracing::debug!(url, streams = streams.len(), "deep probe streams");
        Classification::from_outcome(Stage::DeepProbe, deep::check_streams(&format, &streams))
            .unwrap_or_else(|| Classification {
                verdict: Verdict::Accept,
                stage: Stage::DeepProbe,
                reason: "deep probe found no MP4 signature".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted HTTP answers keyed by URL; unknown URLs are unreachable.
    #[derive(Default)]
    struct FakeHttp {
        routes: HashMap<String, (u32, String)>,
        content_type_calls: AtomicUsize,
    }

    impl FakeHttp {
        fn route(mut self, url: &str, status: u32, ct: &str) -> Self {
            self.routes
                .insert(url.to_string(), (status, ct.to_string()));
            self
        }
    }

    impl HttpInspector for FakeHttp {
        async fn status(&self, url: &str) -> u32 {
            self.routes.get(url).map(|r| r.0).unwrap_or(0)
        }

        async fn content_type(&self, url: &str) -> String {
            self.content_type_calls.fetch_add(1, Ordering::SeqCst);
            self.routes
                .get(url)
                .map(|r| r.1.clone())
                .unwrap_or_else(|| content_type::UNKNOWN.to_string())
        }
    }

    #[derive(Default)]
    struct FakeMedia {
        format: Option<FormatInfo>,
        streams: Vec<StreamInfo>,
        calls: AtomicUsize,
    }

    impl MediaInspector for FakeMedia {
        async fn format(&self, _url: &str) -> Option<FormatInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.format.clone()
        }

        async fn streams(&self, _url: &str) -> Vec<StreamInfo> {
            self.streams.clone()
        }
    }

    fn no_probe(http: FakeHttp) -> Classifier<FakeHttp, FakeMedia> {
        Classifier::new(http, None)
    }

    fn mov_format() -> FormatInfo {
        FormatInfo {
            format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            filename: "http://x/blob".to_string(),
        }
    }

    #[test]
    fn status_range() {
        assert_eq!(check_status(200), StageOutcome::Undecided);
        assert_eq!(check_status(302), StageOutcome::Undecided);
        assert_eq!(
            check_status(404),
            StageOutcome::Reject("invalid status 404".to_string())
        );
        assert_eq!(
            check_status(0),
            StageOutcome::Reject("invalid status 000".to_string())
        );
        assert!(matches!(check_status(500), StageOutcome::Reject(_)));
    }

    #[tokio::test]
    async fn not_found_rejected_before_pattern() {
        let c = no_probe(FakeHttp::default().route("http://x/live.m3u8", 404, "text/html"));
        let r = c.classify("http://x/live.m3u8").await;
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.stage, Stage::Status);
        assert_eq!(r.reason, "invalid status 404");
    }

    #[tokio::test]
    async fn mp4_pattern_skips_content_type_request() {
        let url = "http://x/stream.mp4?format=mp4";
        let http = FakeHttp::default().route(url, 200, "application/vnd.apple.mpegurl");
        let c = no_probe(http);
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.stage, Stage::Pattern);
        assert_eq!(c.http.content_type_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn hls_content_type_accepted() {
        let url = "http://x/live/index.m3u8";
        let c = no_probe(FakeHttp::default().route(url, 200, "application/vnd.apple.mpegurl"));
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Accept);
        assert_eq!(r.stage, Stage::ContentType);
    }

    #[tokio::test]
    async fn html_without_probe_is_error_page() {
        let url = "http://x/channel";
        let c = no_probe(FakeHttp::default().route(url, 200, "text/html"));
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.stage, Stage::Fallback);
        assert!(r.reason.contains("error page"));
    }

    #[tokio::test]
    async fn unknown_content_type_without_probe_rejected() {
        let url = "http://x/channel";
        let c = no_probe(FakeHttp::default().route(url, 200, content_type::UNKNOWN));
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.stage, Stage::Fallback);
    }

    #[tokio::test]
    async fn unreachable_url_rejected_as_000() {
        let c = no_probe(FakeHttp::default());
        let r = c.classify("http://unreachable.invalid/live").await;
        assert_eq!(r.reason, "invalid status 000");
    }

    #[tokio::test]
    async fn empty_url_rejected_without_network() {
        let c = no_probe(FakeHttp::default());
        let r = c.classify("   ").await;
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.stage, Stage::Status);
        assert_eq!(c.http.content_type_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn octet_stream_short_circuits_before_deep_probe() {
        let url = "http://x/blob";
        let http = FakeHttp::default().route(url, 200, "application/octet-stream");
        let media = FakeMedia {
            format: Some(mov_format()),
            ..FakeMedia::default()
        };
        let c = Classifier::new(http, Some(media));
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Accept);
        assert_eq!(r.stage, Stage::ContentType);
        assert_eq!(c.media.as_ref().unwrap().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deferred_octet_stream_reaches_deep_probe() {
        let url = "http://x/blob";
        let http = FakeHttp::default().route(url, 200, "application/octet-stream");
        let media = FakeMedia {
            format: Some(mov_format()),
            ..FakeMedia::default()
        };
        let c = Classifier::new(http, Some(media)).with_deferred_octet_stream(true);
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Reject);
        assert_eq!(r.stage, Stage::DeepProbe);
    }

    #[tokio::test]
    async fn deferred_octet_stream_without_probe_still_accepts() {
        let url = "http://x/blob";
        let http = FakeHttp::default().route(url, 200, "application/octet-stream");
        let c = no_probe(http).with_deferred_octet_stream(true);
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Accept);
        assert_eq!(r.stage, Stage::ContentType);
    }

    #[tokio::test]
    async fn deep_probe_decides_unlisted_type() {
        let url = "http://x/live";
        let http = FakeHttp::default().route(url, 200, "text/html");
        let media = FakeMedia {
            format: Some(FormatInfo {
                format_name: "mpegts".to_string(),
                filename: url.to_string(),
            }),
            streams: vec![
                StreamInfo {
                    codec_type: "video".to_string(),
                    codec_name: "h264".to_string(),
                },
                StreamInfo {
                    codec_type: "audio".to_string(),
                    codec_name: "aac".to_string(),
                },
            ],
            ..FakeMedia::default()
        };
        let c = Classifier::new(http, Some(media));
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Accept);
        assert_eq!(r.stage, Stage::DeepProbe);
    }

    #[tokio::test]
    async fn deep_probe_without_metadata_accepts() {
        let url = "http://x/live";
        let http = FakeHttp::default().route(url, 200, content_type::UNKNOWN);
        let c = Classifier::new(http, Some(FakeMedia::default()));
        let r = c.classify(url).await;
        assert_eq!(r.verdict, Verdict::Accept);
        assert_eq!(r.stage, Stage::DeepProbe);
    }
}
