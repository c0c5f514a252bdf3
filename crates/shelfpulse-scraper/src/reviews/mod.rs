//! Review extraction from product pages.
//!
//! A product page goes through an ordered cascade of [`ReviewRule`]s that
//! locate review containers; each container is then mined field by field.
//! When nothing usable is found the extractor can substitute a labelled
//! synthetic set.

mod fields;
mod junk;
mod rules;
mod synthetic;
mod timestamp;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use shelfpulse_core::{RawReview, ReviewOrigin};

use crate::fetch::{ContentFetcher, FetchMode};
use crate::text::{collapse_whitespace, decode_html};

pub use junk::is_meaningful_review_text;
pub use rules::DEFAULT_REVIEW_RULES;
pub use synthetic::{synthetic_reviews, TEMPLATE_COUNT};
pub use timestamp::parse_timestamp;

/// One way of locating review records on a page.
pub enum ReviewRule {
    /// `schema.org` `Review` objects inside JSON-LD script blocks.
    JsonLd { label: &'static str },
    /// CSS selector matching one container per review.
    Selector {
        label: &'static str,
        selector: Selector,
    },
}

impl ReviewRule {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ReviewRule::JsonLd { label } | ReviewRule::Selector { label, .. } => label,
        }
    }

    fn apply(&self, document: &Html, max_reviews: usize, now: DateTime<Utc>) -> Option<Vec<RawReview>> {
        let mut found = Vec::new();
        match self {
            ReviewRule::JsonLd { .. } => {
                for script in document.select(&rules::JSON_LD_SCRIPTS) {
                    let raw: String = script.text().collect();
                    match serde_json::from_str::<Value>(&raw) {
                        Ok(value) => collect_json_ld(&value, now, &mut found),
                        Err(err) => tracing::trace!(error = %err, "skipping malformed JSON-LD block"),
                    }
                }
                found.truncate(max_reviews);
            }
            ReviewRule::Selector { selector, .. } => {
                for element in document.select(selector) {
                    if found.len() >= max_reviews {
                        break;
                    }
                    if contains_nested_match(&element, selector) {
                        continue;
                    }
                    if let Some(review) = fields::review_from_element(&element, now) {
                        found.push(review);
                    }
                }
            }
        }
        (!found.is_empty()).then_some(found)
    }
}

/// Generic selectors also hit list wrappers; only the innermost match is a
/// single review.
fn contains_nested_match(element: &ElementRef<'_>, selector: &Selector) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|inner| selector.matches(&inner))
}

fn collect_json_ld(value: &Value, now: DateTime<Utc>, out: &mut Vec<RawReview>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_json_ld(item, now, out);
            }
        }
        Value::Object(map) => {
            if is_review_type(map.get("@type")) {
                if let Some(review) = review_from_json(map, now) {
                    out.push(review);
                }
                return;
            }
            for nested in map.values() {
                collect_json_ld(nested, now, out);
            }
        }
        _ => {}
    }
}

fn is_review_type(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(t)) => t == "Review",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Review")),
        _ => false,
    }
}

fn review_from_json(map: &Map<String, Value>, now: DateTime<Utc>) -> Option<RawReview> {
    let rating = map
        .get("reviewRating")
        .and_then(|r| r.get("ratingValue"))
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .and_then(RawReview::checked_rating);
    let text = ["reviewBody", "description"]
        .into_iter()
        .filter_map(|key| map.get(key).and_then(Value::as_str))
        .map(|raw| collapse_whitespace(&decode_html(raw)))
        .find(|t| is_meaningful_review_text(t));
    if rating.is_none() && text.is_none() {
        return None;
    }
    let author = match map.get("author") {
        Some(Value::String(name)) => fields::clean_author(name),
        Some(Value::Object(obj)) => obj
            .get("name")
            .and_then(Value::as_str)
            .and_then(fields::clean_author),
        _ => None,
    };
    let timestamp = map
        .get("datePublished")
        .and_then(Value::as_str)
        .and_then(|raw| parse_timestamp(raw, now))
        .unwrap_or(now);
    Some(RawReview {
        rating,
        text,
        author,
        timestamp: Some(timestamp),
        origin: ReviewOrigin::Real,
    })
}

/// Reviews found by the first matching rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewMatch {
    pub rule: &'static str,
    pub reviews: Vec<RawReview>,
}

/// Run `rules` in order over `content`; the first rule producing at least
/// one valid review wins. At most `max_reviews` reviews are returned.
#[must_use]
pub fn extract_reviews_with_rules(
    rules: &[ReviewRule],
    content: &str,
    max_reviews: usize,
    now: DateTime<Utc>,
) -> Option<ReviewMatch> {
    if max_reviews == 0 {
        return None;
    }
    let document = Html::parse_document(content);
    for rule in rules {
        if let Some(reviews) = rule.apply(&document, max_reviews, now) {
            tracing::debug!(rule = rule.label(), count = reviews.len(), "review rule matched");
            return Some(ReviewMatch {
                rule: rule.label(),
                reviews,
            });
        }
    }
    None
}

/// [`extract_reviews_with_rules`] over [`DEFAULT_REVIEW_RULES`].
#[must_use]
pub fn extract_reviews(content: &str, max_reviews: usize, now: DateTime<Utc>) -> Option<ReviewMatch> {
    extract_reviews_with_rules(&DEFAULT_REVIEW_RULES, content, max_reviews, now)
}

/// Why a product produced no real reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The page could not be fetched; carries [`crate::FetchError::kind`].
    FetchFailed { kind: &'static str },
    /// The page was fetched but no rule matched.
    NoMatch,
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::FetchFailed { kind } => write!(f, "fetch failed ({kind})"),
            EmptyReason::NoMatch => write!(f, "no reviews matched"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted { rule: &'static str },
    SyntheticFallback { reason: EmptyReason },
    Empty { reason: EmptyReason },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewExtraction {
    pub reviews: Vec<RawReview>,
    pub outcome: ExtractionOutcome,
}

impl ReviewExtraction {
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::SyntheticFallback { .. })
    }
}

pub struct ReviewExtractor {
    fetcher: Arc<dyn ContentFetcher>,
    allow_synthetic: bool,
}

impl ReviewExtractor {
    #[must_use]
    pub fn new(fetcher: Arc<dyn ContentFetcher>, allow_synthetic: bool) -> Self {
        Self {
            fetcher,
            allow_synthetic,
        }
    }

    /// Fetch `product_url` and extract up to `max_reviews` reviews.
    ///
    /// Never fails: fetch errors count as zero reviews.
    pub async fn extract(&self, product_url: &str, max_reviews: usize) -> ReviewExtraction {
        let now = Utc::now();
        let reason = match self.fetcher.fetch(product_url, FetchMode::Rendered).await {
            Ok(content) => match extract_reviews(&content, max_reviews, now) {
                Some(found) => {
                    return ReviewExtraction {
                        reviews: found.reviews,
                        outcome: ExtractionOutcome::Extracted { rule: found.rule },
                    };
                }
                None => EmptyReason::NoMatch,
            },
            Err(err) => {
                tracing::warn!(
                    url = %product_url,
                    kind = err.kind(),
                    error = %err,
                    "product page fetch failed"
                );
                EmptyReason::FetchFailed { kind: err.kind() }
            }
        };

        if self.allow_synthetic && max_reviews > 0 {
            tracing::info!(url = %product_url, reason = %reason, "using synthetic reviews");
            ReviewExtraction {
                reviews: synthetic_reviews(product_url, max_reviews, now),
                outcome: ExtractionOutcome::SyntheticFallback { reason },
            }
        } else {
            tracing::info!(url = %product_url, reason = %reason, "no reviews extracted");
            ReviewExtraction {
                reviews: Vec::new(),
                outcome: ExtractionOutcome::Empty { reason },
            }
        }
    }
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
