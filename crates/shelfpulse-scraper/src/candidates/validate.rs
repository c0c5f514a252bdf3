//! Product-name cleanup and plausibility checks.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::strip_html;

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-.,&()%]").expect("valid regex"));

/// Strings that are UI chrome rather than product names.
const UI_TERMS: &[&str] = &[
    "search",
    "filter",
    "sort",
    "view all",
    "see more",
    "next",
    "previous",
    "page",
    "results",
    "loading",
    "menu",
    "navigation",
    "add to cart",
    "quick view",
];

/// Words that make a long name still look like a grocery listing.
const PRODUCT_INDICATORS: &[&str] = &[
    "oz",
    "lb",
    "lbs",
    "kg",
    "gram",
    "ml",
    "liter",
    "pack",
    "count",
    "ct",
    "piece",
    "pc",
    "organic",
    "natural",
    "fresh",
    "frozen",
    "low",
    "whole",
    "skim",
    "fat",
    "free",
    "gluten",
    "sugar",
    "sodium",
    "calorie",
    "kroger",
    "simple truth",
    "private selection",
];

const MIN_NAME_CHARS: usize = 5;
const MAX_PLAIN_WORDS: usize = 12;

/// Clean a raw name: strip tags, collapse whitespace and drop characters
/// outside word characters, whitespace and `-.,&()%`.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    let stripped = strip_html(raw);
    let filtered = DISALLOWED_CHARS.replace_all(&stripped, "");
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heuristic check that a cleaned string names a product.
///
/// Needs at least five characters, no UI chrome terms, at least two words,
/// and either at most twelve words or a product indicator word.
#[must_use]
pub fn looks_like_product_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return false;
    }
    let lowered = trimmed.to_lowercase();
    if UI_TERMS.iter().any(|t| contains_term(&lowered, t)) {
        return false;
    }
    let word_count = lowered.split_whitespace().count();
    if word_count < 2 {
        return false;
    }
    word_count <= MAX_PLAIN_WORDS || PRODUCT_INDICATORS.iter().any(|t| contains_term(&lowered, t))
}

/// Dedup key for names: lowercase, punctuation removed, whitespace collapsed.
#[must_use]
pub fn normalized_name_key(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word (or whole-phrase) containment on an already-lowercased string.
fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_strips_markup_and_symbols() {
        assert_eq!(
            clean_name("<span>Oreo®  Chocolate Sandwich Cookies!</span>"),
            "Oreo Chocolate Sandwich Cookies"
        );
        assert_eq!(
            clean_name("Kroger 2% Reduced Fat Milk (1 gal)"),
            "Kroger 2% Reduced Fat Milk (1 gal)"
        );
    }

    #[test]
    fn accepts_typical_product_names() {
        assert!(looks_like_product_name("Chips Ahoy! Original Cookies"));
        assert!(looks_like_product_name("Simple Truth Organic Whole Milk"));
    }

    #[test]
    fn rejects_short_and_single_word_names() {
        assert!(!looks_like_product_name("Milk"));
        assert!(!looks_like_product_name("Cookies"));
    }

    #[test]
    fn rejects_ui_chrome() {
        assert!(!looks_like_product_name("View All Cookies"));
        assert!(!looks_like_product_name("Add to Cart now please"));
        assert!(!looks_like_product_name("Next page of cookies"));
    }

    #[test]
    fn ui_terms_match_whole_words_only() {
        // "sorted" and "pages" are not the terms "sort" and "page".
        assert!(looks_like_product_name("Assorted Butter Cookies Tin"));
    }

    #[test]
    fn long_names_need_an_indicator() {
        let plain = "one two three four five six seven eight nine ten eleven twelve thirteen";
        assert!(!looks_like_product_name(plain));
        let with_indicator =
            "Kroger family size chocolate chip cookies with real chocolate chunks baked fresh 18 oz";
        assert!(looks_like_product_name(with_indicator));
    }

    #[test]
    fn normalized_key_ignores_case_and_punctuation() {
        assert_eq!(
            normalized_name_key("Oreo, Chocolate  Sandwich-Cookies!"),
            normalized_name_key("oreo chocolate sandwichcookies")
        );
    }
}
