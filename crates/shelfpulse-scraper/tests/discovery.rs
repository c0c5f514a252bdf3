//! Integration tests for `DiscoveryOrchestrator`.
//!
//! Most tests drive the orchestrator with a scripted fetcher that counts
//! calls; the last one runs the real `HttpFetcher` against `wiremock`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfpulse_core::Category;
use shelfpulse_scraper::discovery::AttemptOutcome;
use shelfpulse_scraper::{
    ContentFetcher, DiscoveryOrchestrator, DiscoveryStrategy, FetchError, FetchMode, HttpFetcher,
    SiteProfile,
};

/// Replays canned responses in call order and records every request.
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: Mutex<Vec<(String, FetchMode)>>,
    delay: Option<Duration>,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Result<String, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push((url.to_string(), mode));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(FetchError::Network {
                url: url.to_string(),
                detail: "no scripted response".to_string(),
            })
        })
    }
}

fn site() -> SiteProfile {
    SiteProfile::new("https://www.kroger.com", Some("01400465".to_string())).unwrap()
}

fn listing(names: &[(&str, &str)]) -> String {
    let tiles: String = names
        .iter()
        .map(|(slug, name)| format!(r#"<a href="/p/{slug}" aria-label="{name}">tile</a>"#))
        .collect();
    format!("<html><body>{tiles}</body></html>")
}

fn blocked(url: &str) -> Result<String, FetchError> {
    Err(FetchError::Blocked {
        url: url.to_string(),
        reason: "HTTP 403".to_string(),
    })
}

const BUDGET: Duration = Duration::from_secs(30);

#[tokio::test]
async fn first_successful_strategy_stops_the_cascade() {
    let fetcher = ScriptedFetcher::new(vec![
        blocked("store"),
        Ok("<html><body><p>No results</p></body></html>".to_string()),
        Ok(listing(&[
            ("oreo/1", "Oreo Chocolate Sandwich Cookies"),
            ("chips-ahoy/2", "Chips Ahoy Original Cookies"),
        ])),
        Ok(listing(&[("never/9", "Never Fetched Cookie Pack")])),
    ]);
    let orchestrator = DiscoveryOrchestrator::new(fetcher.clone(), site());
    let category = Category::parse("cookies").unwrap();

    let report = orchestrator.discover_detailed(&category, 5, BUDGET).await;

    assert_eq!(fetcher.call_count(), 3);
    assert_eq!(report.winning_strategy(), Some(DiscoveryStrategy::MobileSearch));
    assert_eq!(report.candidates.len(), 2);
    assert_eq!(
        report.attempts[0].outcome,
        AttemptOutcome::Failed { kind: "blocked" }
    );
    assert_eq!(report.attempts[1].outcome, AttemptOutcome::Empty);
    assert!(!report.budget_exhausted);

    let calls = fetcher.calls.lock().unwrap();
    assert_eq!(calls[0].1, FetchMode::Rendered);
    assert!(calls[0].0.contains("storeId=01400465"));
    assert_eq!(calls[2].1, FetchMode::Mobile);
}

#[tokio::test]
async fn discovered_candidates_have_unique_urls_and_names() {
    let fetcher = ScriptedFetcher::new(vec![Ok(listing(&[
        ("oreo/1", "Oreo Chocolate Sandwich Cookies"),
        ("oreo/1", "Oreo Double Stuf Cookies"),
        ("oreo-family/3", "OREO Chocolate Sandwich Cookies"),
        ("nutter-butter/4", "Nutter Butter Peanut Butter Cookies"),
    ]))]);
    let orchestrator = DiscoveryOrchestrator::new(fetcher, site());
    let category = Category::parse("cookies").unwrap();

    let candidates = orchestrator.discover(&category, 10, BUDGET).await;

    let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Oreo Chocolate Sandwich Cookies",
            "Nutter Butter Peanut Butter Cookies"
        ]
    );
}

#[tokio::test]
async fn every_strategy_failing_yields_empty_list() {
    let fetcher = ScriptedFetcher::new(Vec::new());
    let orchestrator = DiscoveryOrchestrator::new(fetcher.clone(), site());
    let category = Category::parse("kombucha").unwrap();

    let report = orchestrator.discover_detailed(&category, 5, BUDGET).await;

    assert!(report.candidates.is_empty());
    // No department path for this category, so browse is skipped.
    assert_eq!(fetcher.call_count(), 4);
    assert!(report
        .attempts
        .iter()
        .any(|a| a.strategy == DiscoveryStrategy::CategoryBrowse
            && a.outcome == AttemptOutcome::Skipped));
    assert_eq!(report.winning_strategy(), None);
}

#[tokio::test]
async fn exhausted_budget_returns_empty_without_further_fetches() {
    let fetcher = ScriptedFetcher::slow(Duration::from_millis(500));
    let orchestrator = DiscoveryOrchestrator::new(fetcher.clone(), site());
    let category = Category::parse("cookies").unwrap();

    let report = orchestrator
        .discover_detailed(&category, 5, Duration::from_millis(50))
        .await;

    assert!(report.candidates.is_empty());
    assert!(report.budget_exhausted);
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(
        report.attempts[0].outcome,
        AttemptOutcome::Failed { kind: "timeout" }
    );
}

#[tokio::test]
async fn zero_budget_makes_no_calls() {
    let fetcher = ScriptedFetcher::new(Vec::new());
    let orchestrator = DiscoveryOrchestrator::new(fetcher.clone(), site());
    let category = Category::parse("milk").unwrap();

    let candidates = orchestrator.discover(&category, 5, Duration::ZERO).await;

    assert!(candidates.is_empty());
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn http_discovery_against_mock_site() {
    let server = MockServer::start().await;
    let tiles: String = (0..6)
        .map(|i| {
            format!(
                r#"<div class="product-card"><a href="/p/whole-milk-{i}/000{i}"><h3>Kroger Whole Milk Option {i}</h3></a></div>"#
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "milk"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{tiles}</body></html>")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Arc::new(HttpFetcher::new(5, "shelfpulse-test/0.1", 0, 0).expect("fetcher"));
    let site = SiteProfile::new(&server.uri(), None).expect("site");
    let orchestrator = DiscoveryOrchestrator::new(fetcher, site);
    let category = Category::parse("milk").unwrap();

    let report = orchestrator.discover_detailed(&category, 3, BUDGET).await;

    assert_eq!(report.winning_strategy(), Some(DiscoveryStrategy::Search));
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.candidates[0].name, "Kroger Whole Milk Option 0");
    assert!(report.candidates[0]
        .url
        .starts_with(&format!("{}/p/whole-milk-0", server.uri())));
}

#[test]
fn static_order_matches_documented_cascade() {
    assert_eq!(
        DiscoveryStrategy::DEFAULT_ORDER.map(DiscoveryStrategy::label),
        [
            "store_search",
            "search",
            "mobile_search",
            "category_browse",
            "alternate_query"
        ]
    );
}
