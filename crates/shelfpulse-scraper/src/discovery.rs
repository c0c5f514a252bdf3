//! Time-budgeted, multi-strategy product discovery.
//!
//! Strategies run in a fixed order against a shared wall-clock budget. Each
//! one is a single fetch followed by the candidate cascade; the first
//! strategy that yields a validated candidate ends the run.

use std::sync::Arc;
use std::time::Duration;

use shelfpulse_core::{Category, ProductCandidate};
use tokio::time::Instant;

use crate::candidates::{extract_with_rules, CandidateSet, DEFAULT_RULES};
use crate::error::FetchError;
use crate::fetch::{ContentFetcher, FetchMode};
use crate::site::SiteProfile;

/// Known department pages for common categories.
const BROWSE_PATHS: &[(&str, &str)] = &[
    ("cookies", "snacks/cookies-crackers/cookies"),
    ("cookie", "snacks/cookies-crackers/cookies"),
    ("bread", "bakery/fresh-bread"),
    ("milk", "dairy/milk"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Site search pinned to the configured store.
    StoreSearch,
    /// Site search without store scoping.
    Search,
    /// Site search presenting as a mobile browser.
    MobileSearch,
    /// Department browse page for categories with a known path.
    CategoryBrowse,
    /// Site search with the last query word's plural form flipped.
    AlternateQuery,
}

impl DiscoveryStrategy {
    pub const DEFAULT_ORDER: [DiscoveryStrategy; 5] = [
        DiscoveryStrategy::StoreSearch,
        DiscoveryStrategy::Search,
        DiscoveryStrategy::MobileSearch,
        DiscoveryStrategy::CategoryBrowse,
        DiscoveryStrategy::AlternateQuery,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DiscoveryStrategy::StoreSearch => "store_search",
            DiscoveryStrategy::Search => "search",
            DiscoveryStrategy::MobileSearch => "mobile_search",
            DiscoveryStrategy::CategoryBrowse => "category_browse",
            DiscoveryStrategy::AlternateQuery => "alternate_query",
        }
    }

    /// The URL and fetch mode this strategy would use, or `None` when it does
    /// not apply (no store configured, unknown department, no alternate form).
    #[must_use]
    pub fn target(self, site: &SiteProfile, category: &Category) -> Option<(String, FetchMode)> {
        let query = category.as_str();
        match self {
            DiscoveryStrategy::StoreSearch => site
                .store_id()
                .map(|_| (site.search_url(query, true), FetchMode::Rendered)),
            DiscoveryStrategy::Search => Some((site.search_url(query, false), FetchMode::Raw)),
            DiscoveryStrategy::MobileSearch => {
                Some((site.search_url(query, false), FetchMode::Mobile))
            }
            DiscoveryStrategy::CategoryBrowse => {
                browse_path(query).map(|path| (site.browse_url(path), FetchMode::Raw))
            }
            DiscoveryStrategy::AlternateQuery => alternate_query(query)
                .map(|alt| (site.search_url(&alt, false), FetchMode::Raw)),
        }
    }
}

impl std::fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Department path for a category, matched case-insensitively.
#[must_use]
pub fn browse_path(category: &str) -> Option<&'static str> {
    let key = category.trim().to_lowercase();
    BROWSE_PATHS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, path)| *path)
}

/// Every distinct department path with a known mapping, in table order.
#[must_use]
pub fn known_browse_paths() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = Vec::new();
    for &(_, path) in BROWSE_PATHS {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Flip the plural form of the last word: `cookies` → `cookie`,
/// `berries` → `berry`, `bread` → `breads`.
#[must_use]
pub fn alternate_query(category: &str) -> Option<String> {
    let trimmed = category.trim();
    let (head, last) = match trimmed.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, trimmed),
    };
    if last.chars().count() < 3 || !last.chars().all(char::is_alphabetic) {
        return None;
    }
    let lower = last.to_lowercase();
    let flipped = if let Some(stem) = lower.strip_suffix("ies") {
        format!("{stem}y")
    } else if lower.ends_with("ss") {
        format!("{lower}es")
    } else if let Some(stem) = lower.strip_suffix('s') {
        stem.to_string()
    } else if let Some(stem) = lower.strip_suffix('y') {
        format!("{stem}ies")
    } else {
        format!("{lower}s")
    };
    Some(match head {
        Some(head) => format!("{head} {flipped}"),
        None => flipped,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The candidate cascade matched.
    Found { rule: &'static str, count: usize },
    /// Page fetched but no rule produced a valid candidate.
    Empty,
    /// Fetch failed; treated the same as an empty page.
    Failed { kind: &'static str },
    /// Strategy does not apply to this category or site.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: DiscoveryStrategy,
    pub url: Option<String>,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub candidates: Vec<ProductCandidate>,
    pub attempts: Vec<StrategyAttempt>,
    /// The wall-clock budget ran out before a strategy succeeded.
    pub budget_exhausted: bool,
}

impl DiscoveryReport {
    /// Strategy that produced the candidates, if any.
    #[must_use]
    pub fn winning_strategy(&self) -> Option<DiscoveryStrategy> {
        self.attempts
            .iter()
            .find(|a| matches!(a.outcome, AttemptOutcome::Found { .. }))
            .map(|a| a.strategy)
    }
}

pub struct DiscoveryOrchestrator {
    fetcher: Arc<dyn ContentFetcher>,
    site: SiteProfile,
    strategies: Vec<DiscoveryStrategy>,
}

impl DiscoveryOrchestrator {
    #[must_use]
    pub fn new(fetcher: Arc<dyn ContentFetcher>, site: SiteProfile) -> Self {
        Self {
            fetcher,
            site,
            strategies: DiscoveryStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<DiscoveryStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    #[must_use]
    pub fn site(&self) -> &SiteProfile {
        &self.site
    }

    /// Discover up to `max_products` products for `category`.
    ///
    /// Returns an empty list when every strategy fails or the budget runs
    /// out; the caller decides whether that is terminal.
    pub async fn discover(
        &self,
        category: &Category,
        max_products: usize,
        time_budget: Duration,
    ) -> Vec<ProductCandidate> {
        self.discover_detailed(category, max_products, time_budget)
            .await
            .candidates
    }

    /// [`DiscoveryOrchestrator::discover`] with a per-strategy trace.
    pub async fn discover_detailed(
        &self,
        category: &Category,
        max_products: usize,
        time_budget: Duration,
    ) -> DiscoveryReport {
        let started = Instant::now();
        let mut report = DiscoveryReport::default();

        for &strategy in &self.strategies {
            let elapsed = started.elapsed();
            if elapsed >= time_budget {
                tracing::warn!(
                    category = %category,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "discovery budget exhausted"
                );
                report.budget_exhausted = true;
                break;
            }
            let remaining = time_budget - elapsed;

            let Some((url, mode)) = strategy.target(&self.site, category) else {
                tracing::debug!(strategy = %strategy, "discovery strategy not applicable");
                report.attempts.push(StrategyAttempt {
                    strategy,
                    url: None,
                    outcome: AttemptOutcome::Skipped,
                });
                continue;
            };

            tracing::debug!(strategy = %strategy, url = %url, mode = %mode, "running discovery strategy");
            let fetched = match tokio::time::timeout(remaining, self.fetcher.fetch(&url, mode)).await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout { url: url.clone() }),
            };

            let outcome = match fetched {
                Ok(content) => {
                    match extract_with_rules(&self.site, &DEFAULT_RULES, &content, max_products) {
                        Some(found) => {
                            let mut unique = CandidateSet::default();
                            for candidate in found.candidates {
                                unique.insert(candidate);
                            }
                            report.candidates = unique.into_vec();
                            AttemptOutcome::Found {
                                rule: found.rule,
                                count: report.candidates.len(),
                            }
                        }
                        None => AttemptOutcome::Empty,
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        strategy = %strategy,
                        kind = err.kind(),
                        error = %err,
                        "discovery strategy failed"
                    );
                    AttemptOutcome::Failed { kind: err.kind() }
                }
            };

            let found = matches!(outcome, AttemptOutcome::Found { .. });
            report.attempts.push(StrategyAttempt {
                strategy,
                url: Some(url),
                outcome,
            });
            if found {
                tracing::info!(
                    category = %category,
                    strategy = %strategy,
                    count = report.candidates.len(),
                    "discovery succeeded"
                );
                return report;
            }
        }

        tracing::warn!(category = %category, "discovery found no products");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_path_is_case_insensitive() {
        assert_eq!(browse_path("Milk"), Some("dairy/milk"));
        assert_eq!(browse_path("cookies"), Some("snacks/cookies-crackers/cookies"));
        assert_eq!(browse_path("kombucha"), None);
    }

    #[test]
    fn known_browse_paths_are_distinct() {
        assert_eq!(
            known_browse_paths(),
            vec!["snacks/cookies-crackers/cookies", "bakery/fresh-bread", "dairy/milk"]
        );
    }

    #[test]
    fn alternate_query_flips_last_word() {
        assert_eq!(alternate_query("cookies").as_deref(), Some("cookie"));
        assert_eq!(alternate_query("berries").as_deref(), Some("berry"));
        assert_eq!(alternate_query("bread").as_deref(), Some("breads"));
        assert_eq!(
            alternate_query("chocolate chip cookie").as_deref(),
            Some("chocolate chip cookies")
        );
        assert_eq!(alternate_query("candy").as_deref(), Some("candies"));
        assert_eq!(alternate_query("glass").as_deref(), Some("glasses"));
    }

    #[test]
    fn alternate_query_skips_codes_and_short_words() {
        assert_eq!(alternate_query("2%"), None);
        assert_eq!(alternate_query("ox"), None);
    }

    #[test]
    fn store_search_requires_store() {
        let category = Category::parse("milk").unwrap();
        let no_store = SiteProfile::new("https://www.kroger.com", None).unwrap();
        assert!(DiscoveryStrategy::StoreSearch
            .target(&no_store, &category)
            .is_none());
        let with_store =
            SiteProfile::new("https://www.kroger.com", Some("01400465".to_string())).unwrap();
        let (url, mode) = DiscoveryStrategy::StoreSearch
            .target(&with_store, &category)
            .unwrap();
        assert!(url.ends_with("storeId=01400465"));
        assert_eq!(mode, FetchMode::Rendered);
    }
}
