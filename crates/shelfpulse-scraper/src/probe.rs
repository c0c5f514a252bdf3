//! Site access diagnostics.
//!
//! Fetches the home page, a search page (desktop and mobile) and every known
//! department page, and reports how each one was classified.

use shelfpulse_core::Category;

use crate::candidates::extract_candidates;
use crate::discovery::known_browse_paths;
use crate::fetch::{ContentFetcher, FetchMode};
use crate::site::SiteProfile;

/// Substrings whose presence suggests a product listing page.
const LISTING_INDICATORS: &[&str] = &["/p/", "product", "href"];

/// A page counts as a listing when at least this many indicators appear.
const MIN_LISTING_INDICATORS: usize = 2;

const PRODUCT_LINK_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub label: String,
    pub url: String,
    pub mode: FetchMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ok {
        bytes: usize,
        indicators: usize,
        product_links: usize,
    },
    Failed {
        kind: &'static str,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target: ProbeTarget,
    pub status: ProbeStatus,
}

impl ProbeResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ProbeStatus::Ok { .. })
    }

    /// Fetched and carries enough listing indicators to hold products.
    #[must_use]
    pub fn looks_like_listing(&self) -> bool {
        matches!(
            self.status,
            ProbeStatus::Ok { indicators, .. } if indicators >= MIN_LISTING_INDICATORS
        )
    }
}

/// Pages probed for `category`, in order.
#[must_use]
pub fn probe_targets(site: &SiteProfile, category: &Category) -> Vec<ProbeTarget> {
    let search = site.search_url(category.as_str(), false);
    let mut targets = vec![
        ProbeTarget {
            label: "home".to_string(),
            url: site.home_url(),
            mode: FetchMode::Raw,
        },
        ProbeTarget {
            label: "search".to_string(),
            url: search.clone(),
            mode: FetchMode::Raw,
        },
        ProbeTarget {
            label: "search (mobile)".to_string(),
            url: search,
            mode: FetchMode::Mobile,
        },
    ];
    targets.extend(known_browse_paths().into_iter().map(|path| ProbeTarget {
        label: format!("browse {path}"),
        url: site.browse_url(path),
        mode: FetchMode::Raw,
    }));
    targets
}

/// Fetch every target sequentially and classify the outcome.
pub async fn probe_site(
    fetcher: &dyn ContentFetcher,
    site: &SiteProfile,
    category: &Category,
) -> Vec<ProbeResult> {
    let mut results = Vec::new();
    for target in probe_targets(site, category) {
        let status = match fetcher.fetch(&target.url, target.mode).await {
            Ok(content) => {
                let lowered = content.to_lowercase();
                ProbeStatus::Ok {
                    bytes: content.len(),
                    indicators: LISTING_INDICATORS
                        .iter()
                        .filter(|i| lowered.contains(*i))
                        .count(),
                    product_links: extract_candidates(site, &content, PRODUCT_LINK_CAP).len(),
                }
            }
            Err(err) => ProbeStatus::Failed {
                kind: err.kind(),
                detail: err.to_string(),
            },
        };
        tracing::info!(label = %target.label, url = %target.url, ?status, "probe result");
        results.push(ProbeResult { target, status });
    }
    results
}
