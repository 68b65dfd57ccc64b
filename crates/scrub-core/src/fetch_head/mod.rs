//! HTTP probing of playlist URLs.
//!
//! Uses the curl crate (libcurl) for the two network checks the classifier
//! needs: the final status code after redirects, and the `Content-Type` of a
//! HEAD response. Neither check returns an error; failures become status `0`
//! or content type `unknown`.

mod parse;

use std::str;
use std::time::Duration;

use crate::classify::{content_type::UNKNOWN, HttpInspector};
use crate::config::ScrubConfig;
use crate::error::ScrubError;
use crate::retry::{self, ProbeError, RetryPolicy};

/// Headers of the final response of a HEAD request.
#[derive(Debug, Clone, Default)]
pub struct HeadResult {
    /// Status code from the last status line.
    pub status: Option<u32>,
    /// Lower-cased `Content-Type`, if present and non-empty.
    pub content_type: Option<String>,
    /// `Content-Length`, if present.
    pub content_length: Option<u64>,
}

/// Timeouts, retry policy and User-Agent for the HTTP checks.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub status_timeout: Duration,
    pub content_type_timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: Option<String>,
}

impl HttpSettings {
    pub fn from_config(cfg: &ScrubConfig) -> Self {
        Self {
            status_timeout: cfg.status_timeout(),
            content_type_timeout: cfg.content_type_timeout(),
            connect_timeout: cfg.connect_timeout(),
            retry: cfg.retry_policy(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self::from_config(&ScrubConfig::default())
    }
}

/// Fails with `ScrubError::Dependency` when the linked libcurl cannot speak HTTP(S).
pub fn check_http_support() -> Result<(), ScrubError> {
    let version = curl::Version::get();
    let protocols: Vec<&str> = version.protocols().collect();
    for needed in ["http", "https"] {
        if !protocols.iter().any(|p| p.eq_ignore_ascii_case(needed)) {
            return Err(ScrubError::Dependency(format!(
                "libcurl {} has no {} support",
                version.version(),
                needed
            )));
        }
    }
    tracing::debug!("using libcurl {}", version.version());
    Ok(())
}

fn easy_for(
    url: &str,
    timeout: Duration,
    settings: &HttpSettings,
) -> Result<curl::easy::Easy, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(settings.connect_timeout)?;
    easy.timeout(timeout)?;
    if let Some(ua) = &settings.user_agent {
        easy.useragent(ua)?;
    }
    Ok(easy)
}

/// True for statuses the retry policy treats as transient.
fn is_transient_status(code: u32) -> bool {
    !matches!(retry::classify_http_status(code), retry::ErrorKind::Other)
}

/// One GET attempt. The transfer is cut on the first body chunk: only the
/// status matters, and live streams never finish on their own.
fn status_attempt(url: &str, settings: &HttpSettings) -> Result<u32, ProbeError> {
    let mut easy = easy_for(url, settings.status_timeout, settings)?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|_data| Ok(0))?;
        transfer.perform()
    };

    let code = easy.response_code().unwrap_or(0);
    if code == 0 {
        return match performed {
            Err(e) => Err(ProbeError::Curl(e)),
            Ok(()) => Ok(0),
        };
    }
    if is_transient_status(code) {
        return Err(ProbeError::Http(code));
    }
    Ok(code)
}

/// Final HTTP status for `url` after redirects, `0` when no response arrived.
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn status_check(url: &str, settings: &HttpSettings) -> u32 {
    match retry::run_with_retry(&settings.retry, || status_attempt(url, settings)) {
        Ok(code) => code,
        Err(ProbeError::Http(code)) => code,
        Err(ProbeError::Curl(e)) => {
            tracing::debug!(url, "status check failed: {}", e);
            0
        }
    }
}

/// One HEAD attempt, collecting header lines of every response block.
fn head_attempt(url: &str, settings: &HttpSettings) -> Result<HeadResult, ProbeError> {
    let mut headers: Vec<String> = Vec::new();
    let mut easy = easy_for(url, settings.content_type_timeout, settings)?;
    easy.nobody(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let head = parse::parse_headers(&headers);
    match head.status {
        Some(code) if is_transient_status(code) => Err(ProbeError::Http(code)),
        _ => Ok(head),
    }
}

/// Performs a HEAD request and returns the final response's headers.
/// Follows redirects. Blocking; call from `spawn_blocking` if used from async code.
pub fn probe(url: &str, settings: &HttpSettings) -> Result<HeadResult, ProbeError> {
    retry::run_with_retry(&settings.retry, || head_attempt(url, settings))
}

/// Lower-cased content type reported by a HEAD request, or `unknown`.
pub fn content_type(url: &str, settings: &HttpSettings) -> String {
    match probe(url, settings) {
        Ok(head) => {
            tracing::debug!(
                url,
                status = ?head.status,
                content_length = ?head.content_length,
                "HEAD ok"
            );
            head.content_type.unwrap_or_else(|| UNKNOWN.to_string())
        }
        Err(e) => {
            tracing::debug!(url, "HEAD failed: {}", e);
            UNKNOWN.to_string()
        }
    }
}

/// [`HttpInspector`] backed by libcurl, running each blocking request on the
/// tokio blocking pool.
#[derive(Debug, Clone, Default)]
pub struct CurlInspector {
    settings: HttpSettings,
}

impl CurlInspector {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

impl HttpInspector for CurlInspector {
    async fn status(&self, url: &str) -> u32 {
        let url = url.to_string();
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || status_check(&url, &settings))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("status task join: {}", e);
                0
            })
    }

    async fn content_type(&self, url: &str) -> String {
        let url = url.to_string();
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || content_type(&url, &settings))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("content type task join: {}", e);
                UNKNOWN.to_string()
            })
    }
}
