//! Page fetching seam and its reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{FetchError, ScraperError};
use crate::rate_limit::retry_with_backoff;

const MOBILE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";

/// Bodies shorter than this are interstitials or error stubs, never real pages.
pub const MIN_CONTENT_BYTES: usize = 256;

/// Weak block markers only count on small pages; large storefront pages
/// routinely mention captcha scripts in their bundles.
const WEAK_MARKER_MAX_BYTES: usize = 20_000;

const WEAK_BLOCK_MARKERS: &[&str] = &[
    "access denied",
    "request blocked",
    "captcha",
    "ray id",
    "unusual traffic",
];

/// How a page should be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Script-rendered page as a browser would see it.
    Rendered,
    /// Plain HTTP GET.
    Raw,
    /// Plain HTTP GET presenting as a mobile browser.
    Mobile,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Rendered => write!(f, "rendered"),
            FetchMode::Raw => write!(f, "raw"),
            FetchMode::Mobile => write!(f, "mobile"),
        }
    }
}

/// Anything that can turn a URL into page content.
///
/// Implementations classify failures into [`FetchError`]; callers never
/// branch on the transport behind this trait.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError>;
}

/// reqwest-backed [`ContentFetcher`].
///
/// Does not execute scripts, so [`FetchMode::Rendered`] is served as a raw
/// GET with full browser headers.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_app_config(config: &shelfpulse_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    async fn fetch_once(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache");
        if mode == FetchMode::Mobile {
            request = request.header(reqwest::header::USER_AGENT, MOBILE_UA);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;
        let status = response.status();

        if matches!(status.as_u16(), 403 | 429 | 503) {
            return Err(FetchError::Blocked {
                url: url.to_owned(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Network {
                url: url.to_owned(),
                detail: format!("unexpected HTTP status {}", status.as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;
        classify_content(url, &body)?;
        Ok(body)
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(url, mode)
        })
        .await
    }
}

/// Reject bodies that are bot walls or too short to be a real page.
///
/// # Errors
///
/// Returns [`FetchError::Blocked`] with the triggering reason.
pub fn classify_content(url: &str, body: &str) -> Result<(), FetchError> {
    let trimmed = body.trim();
    if trimmed.len() < MIN_CONTENT_BYTES {
        return Err(FetchError::Blocked {
            url: url.to_owned(),
            reason: format!("short content ({} bytes)", trimmed.len()),
        });
    }
    if looks_like_bot_challenge(trimmed) {
        return Err(FetchError::Blocked {
            url: url.to_owned(),
            reason: "bot challenge page".to_owned(),
        });
    }
    if trimmed.len() < WEAK_MARKER_MAX_BYTES {
        let lowered = trimmed.to_ascii_lowercase();
        if let Some(marker) = WEAK_BLOCK_MARKERS.iter().find(|m| lowered.contains(*m)) {
            return Err(FetchError::Blocked {
                url: url.to_owned(),
                reason: format!("block marker '{marker}'"),
            });
        }
    }
    Ok(())
}

fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let has_cloudflare_banner = lowered.contains("attention required! | cloudflare");
    let has_challenge_platform = lowered.contains("/cdn-cgi/challenge-platform/");
    let has_just_a_moment = lowered.contains("just a moment...");
    let has_cookie_gate = lowered.contains("please enable cookies");
    let has_cf_chl = lowered.contains("cf-chl-");
    let has_akamai_reference = lowered.contains("errors.edgesuite.net");

    has_cloudflare_banner
        || has_challenge_platform
        || has_akamai_reference
        || (has_just_a_moment && has_cookie_gate)
        || (has_just_a_moment && has_cf_chl)
}
