use thiserror::Error;

/// Failure classes reported by a [`crate::ContentFetcher`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("blocked by {url}: {reason}")]
    Blocked { url: String, reason: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("network error fetching {url}: {detail}")]
    Network { url: String, detail: String },
}

impl FetchError {
    /// Short label used in logs and diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Blocked { .. } => "blocked",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Network { .. } => "network",
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_owned(),
            }
        } else {
            FetchError::Network {
                url: url.to_owned(),
                detail: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid site base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
