//! Junk-text filter for review bodies.
//!
//! Review containers on storefront pages also hold vote buttons, legal
//! footers and sort widgets. A text field is kept only if it reads like a
//! customer's sentence about the product.

use std::sync::LazyLock;

use regex::Regex;

use super::timestamp::is_date_only;

/// Phrases that never appear in a genuine review body.
const BOILERPLATE_PHRASES: &[&str] = &[
    "was this review helpful",
    "report this review",
    "report review",
    "sort by",
    "write a review",
    "load more",
    "see all reviews",
    "terms of use",
    "privacy policy",
    "all rights reserved",
    "copyright",
    "©",
    "originally posted on",
    "verified purchaser",
];

/// Single words that are UI chrome when they dominate a short string.
const CHROME_WORDS: &[&str] = &["helpful", "report", "share", "flag", "reply", "yes", "no"];

/// Below this length a chrome word marks the whole string as chrome.
const CHROME_MAX_CHARS: usize = 40;

const SHORT_TEXT_CHARS: usize = 30;
const MIN_TEXT_CHARS: usize = 6;

/// Words that signal a customer talking about a grocery product.
const SENTIMENT_INDICATORS: &[&str] = &[
    "fresh", "stale", "delicious", "tasty", "taste", "tastes", "flavor", "flavorful", "bland",
    "sweet", "salty", "crunchy", "crispy", "soft", "chewy", "moist", "dry", "soggy", "good",
    "great", "bad", "awful", "terrible", "horrible", "excellent", "amazing", "perfect", "okay",
    "average", "decent", "nice", "love", "loved", "loves", "like", "liked", "hate", "hated",
    "favorite", "yummy", "gross", "disappointed", "disappointing", "recommend", "quality",
    "value", "price", "cheap", "expensive", "worth", "expired", "moldy", "broken", "damaged",
    "better", "worse", "best", "worst", "family", "kids", "buy", "bought", "again",
];

static NUMERIC_OR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s/\-.:,()*]+$").expect("valid regex"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z][.!?]").expect("valid regex"));

/// True when `text` reads like a customer review rather than page chrome.
#[must_use]
pub fn is_meaningful_review_text(text: &str) -> bool {
    let trimmed = text.trim();
    let char_count = trimmed.chars().count();
    if char_count < MIN_TEXT_CHARS {
        return false;
    }
    let lowered = trimmed.to_lowercase();

    if BOILERPLATE_PHRASES.iter().any(|p| lowered.contains(p)) {
        return false;
    }
    if NUMERIC_OR_DATE.is_match(trimmed) {
        return false;
    }
    if char_count < SHORT_TEXT_CHARS && is_date_only(trimmed) {
        return false;
    }

    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    if char_count < CHROME_MAX_CHARS && words.iter().any(|w| CHROME_WORDS.contains(w)) {
        let indicator_count = count_indicators(&words);
        if indicator_count == 0 {
            return false;
        }
    }

    let indicators = count_indicators(&words);
    if char_count < SHORT_TEXT_CHARS {
        indicators >= 1
    } else {
        has_sentence_shape(trimmed, words.len()) || indicators >= 2
    }
}

fn count_indicators(words: &[&str]) -> usize {
    words
        .iter()
        .filter(|w| SENTIMENT_INDICATORS.contains(w))
        .count()
}

fn has_sentence_shape(text: &str, word_count: usize) -> bool {
    word_count >= 4 && SENTENCE_END.is_match(text)
}
