//! Product candidate extraction.
//!
//! A page is run through an ordered cascade of [`CandidateRule`]s. The first
//! rule that produces at least one validated candidate wins; results from
//! different rules are never merged.

mod rules;
mod validate;

use std::collections::HashSet;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use shelfpulse_core::ProductCandidate;

use crate::site::SiteProfile;
use crate::text::element_text;

pub use rules::DEFAULT_RULES;
pub use validate::{clean_name, looks_like_product_name, normalized_name_key};

/// Anchor text shorter than this is not used as a name.
const MIN_TEXT_NAME_CHARS: usize = 6;

/// One way of pulling `(url, name)` pairs out of a page.
pub enum CandidateRule {
    /// Regex whose first capture is the href and second the name.
    Pattern { label: &'static str, regex: Regex },
    /// CSS selector matching anchors; the name comes from a sub-cascade.
    Selector {
        label: &'static str,
        selector: Selector,
    },
}

impl CandidateRule {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            CandidateRule::Pattern { label, .. } | CandidateRule::Selector { label, .. } => label,
        }
    }

    /// Apply this rule alone. Returns `None` when it yields no valid candidate.
    fn apply(
        &self,
        site: &SiteProfile,
        content: &str,
        document: &mut Option<Html>,
        max_products: usize,
    ) -> Option<Vec<ProductCandidate>> {
        let mut found = CandidateSet::default();
        match self {
            CandidateRule::Pattern { regex, .. } => {
                for caps in regex.captures_iter(content) {
                    if found.len() >= max_products {
                        break;
                    }
                    let (Some(href), Some(raw_name)) = (caps.get(1), caps.get(2)) else {
                        continue;
                    };
                    offer(site, &mut found, href.as_str(), Some(raw_name.as_str()));
                }
            }
            CandidateRule::Selector { selector, .. } => {
                let doc = document.get_or_insert_with(|| Html::parse_document(content));
                for element in doc.select(selector) {
                    if found.len() >= max_products {
                        break;
                    }
                    let Some(href) = element.value().attr("href") else {
                        continue;
                    };
                    let name = derive_name(&element);
                    offer(site, &mut found, href, name.as_deref());
                }
            }
        }
        (!found.is_empty()).then(|| found.into_vec())
    }
}

/// Validate one raw match and add it to `found` if it is new.
fn offer(site: &SiteProfile, found: &mut CandidateSet, href: &str, raw_name: Option<&str>) {
    let Some(url) = site.resolve(href) else {
        return;
    };
    if !site.is_product_url(&url) {
        return;
    }
    let Some(name) = raw_name.map(clean_name) else {
        return;
    };
    if !looks_like_product_name(&name) {
        return;
    }
    found.insert(ProductCandidate { name, url });
}

/// Name sub-cascade for an anchor: `aria-label`, `title`, heading and
/// title-ish descendants, image alt text, then the anchor's own text.
/// Stops at the first source that yields a plausible product name.
fn derive_name(element: &ElementRef<'_>) -> Option<String> {
    let attrs = ["aria-label", "title"]
        .into_iter()
        .filter_map(|a| element.value().attr(a).map(str::to_owned));
    let descendants = rules::NAME_SELECTORS
        .iter()
        .filter_map(|sel| element.select(sel).next().map(|e| element_text(&e)));
    let image_alt = element
        .select(&rules::IMAGE_WITH_ALT)
        .next()
        .and_then(|img| img.value().attr("alt").map(str::to_owned));
    let own_text = Some(element_text(element)).filter(|t| t.chars().count() >= MIN_TEXT_NAME_CHARS);

    attrs
        .chain(descendants)
        .chain(image_alt)
        .chain(own_text)
        .map(|raw| clean_name(&raw))
        .find(|name| looks_like_product_name(name))
}

/// Ordered, duplicate-free candidate list.
///
/// A candidate is dropped when its URL or its normalized name has been seen
/// before; the first occurrence wins.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen_urls: HashSet<String>,
    seen_names: HashSet<String>,
    items: Vec<ProductCandidate>,
}

impl CandidateSet {
    /// Returns `true` if the candidate was new and kept.
    pub fn insert(&mut self, candidate: ProductCandidate) -> bool {
        let key = normalized_name_key(&candidate.name);
        if key.is_empty()
            || self.seen_urls.contains(&candidate.url)
            || self.seen_names.contains(&key)
        {
            return false;
        }
        self.seen_urls.insert(candidate.url.clone());
        self.seen_names.insert(key);
        self.items.push(candidate);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ProductCandidate> {
        self.items
    }
}

/// Outcome of running the cascade over one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeMatch {
    pub rule: &'static str,
    pub candidates: Vec<ProductCandidate>,
}

/// Run `rules` in order over `content` and return the first rule's
/// non-empty, validated, deduplicated result (at most `max_products` items).
#[must_use]
pub fn extract_with_rules(
    site: &SiteProfile,
    rules: &[CandidateRule],
    content: &str,
    max_products: usize,
) -> Option<CascadeMatch> {
    if max_products == 0 {
        return None;
    }
    let mut document = None;
    for rule in rules {
        match rule.apply(site, content, &mut document, max_products) {
            Some(candidates) => {
                tracing::debug!(
                    rule = rule.label(),
                    count = candidates.len(),
                    "candidate rule matched"
                );
                return Some(CascadeMatch {
                    rule: rule.label(),
                    candidates,
                });
            }
            None => tracing::trace!(rule = rule.label(), "candidate rule yielded nothing"),
        }
    }
    None
}

/// [`extract_with_rules`] over [`DEFAULT_RULES`].
#[must_use]
pub fn extract_candidates(
    site: &SiteProfile,
    content: &str,
    max_products: usize,
) -> Vec<ProductCandidate> {
    extract_with_rules(site, &DEFAULT_RULES, content, max_products)
        .map(|m| m.candidates)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "candidates_test.rs"]
mod tests;
