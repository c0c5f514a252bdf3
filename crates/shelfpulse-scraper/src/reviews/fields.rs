//! Field sub-cascades for a single review element.
//!
//! Each field tries its selectors in order and stops at the first value that
//! parses. A missing field is `None`; only the timestamp has a fallback.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Selector};
use shelfpulse_core::{RawReview, ReviewOrigin};

use super::junk::is_meaningful_review_text;
use super::timestamp::parse_timestamp;
use crate::text::{collapse_whitespace, decode_html, element_text};

const MAX_AUTHOR_CHARS: usize = 60;

static RATING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid regex"));

/// `(selector, attribute)`; a `None` attribute means the element text.
static RATING_SOURCES: LazyLock<Vec<(Selector, Option<&'static str>)>> = LazyLock::new(|| {
    vec![
        (sel(r#"[itemprop="ratingValue"]"#), Some("content")),
        (sel(r#"[itemprop="ratingValue"]"#), None),
        (sel("[data-rating]"), Some("data-rating")),
        (sel(r#"[aria-label*="out of 5"]"#), Some("aria-label")),
        (sel(r#"[aria-label*="star"], [aria-label*="Star"]"#), Some("aria-label")),
        (sel(r#"[class*="rating"]"#), Some("aria-label")),
        (sel(r#"[class*="rating"], [class*="stars"]"#), None),
    ]
});

static TEXT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"[itemprop="reviewBody"]"#,
        r#"[data-testid*="review-text"], [data-testid*="review-body"]"#,
        ".review-text",
        ".review-body",
        r#"[class*="review-text"], [class*="ReviewText"], [class*="review-body"]"#,
        "p",
    ]
    .iter()
    .map(|s| sel(s))
    .collect()
});

static AUTHOR_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"[itemprop="author"] [itemprop="name"]"#,
        r#"[itemprop="author"]"#,
        r#"[data-testid*="author"]"#,
        ".review-author",
        r#"[class*="author"]"#,
        r#"[class*="reviewer"], [class*="nickname"]"#,
    ]
    .iter()
    .map(|s| sel(s))
    .collect()
});

static DATE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"[itemprop="datePublished"]"#,
        r#"[data-testid*="date"]"#,
        r#"[data-testid*="time"]"#,
        ".review-date",
        ".date",
        ".timestamp",
        r#"[class*="date"]"#,
        r#"[class*="time"]"#,
        "time",
        "[datetime]",
        ".posted-date",
        ".review-timestamp",
    ]
    .iter()
    .map(|s| sel(s))
    .collect()
});

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Build a review from one container element.
///
/// Returns `None` when neither a rating nor meaningful text was found.
pub(super) fn review_from_element(element: &ElementRef<'_>, now: DateTime<Utc>) -> Option<RawReview> {
    let rating = extract_rating(element);
    let text = extract_text(element);
    if rating.is_none() && text.is_none() {
        return None;
    }
    Some(RawReview {
        rating,
        text,
        author: extract_author(element),
        timestamp: Some(extract_timestamp(element, now)),
        origin: ReviewOrigin::Real,
    })
}

pub(super) fn extract_rating(element: &ElementRef<'_>) -> Option<f64> {
    if let Some(value) = element.value().attr("data-rating").and_then(parse_rating) {
        return Some(value);
    }
    RATING_SOURCES.iter().find_map(|(selector, attr)| {
        element.select(selector).find_map(|hit| match attr {
            Some(name) => hit.value().attr(name).and_then(parse_rating),
            None => parse_rating(&element_text(&hit)),
        })
    })
}

/// First number in `raw`, accepted only inside the star range.
pub(super) fn parse_rating(raw: &str) -> Option<f64> {
    RATING_NUMBER
        .captures(raw)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .and_then(RawReview::checked_rating)
}

pub(super) fn extract_text(element: &ElementRef<'_>) -> Option<String> {
    TEXT_SELECTORS.iter().find_map(|selector| {
        element
            .select(selector)
            .map(|hit| element_text(&hit))
            .find(|text| is_meaningful_review_text(text))
    })
}

pub(super) fn extract_author(element: &ElementRef<'_>) -> Option<String> {
    AUTHOR_SELECTORS.iter().find_map(|selector| {
        element
            .select(selector)
            .find_map(|hit| clean_author(&element_text(&hit)))
    })
}

/// Strip a leading "By" and reject blank or overlong values.
pub(super) fn clean_author(raw: &str) -> Option<String> {
    let decoded = collapse_whitespace(&decode_html(raw));
    let name = decoded
        .strip_prefix("By ")
        .or_else(|| decoded.strip_prefix("by "))
        .unwrap_or(&decoded)
        .trim();
    let chars = name.chars().count();
    (chars > 0 && chars <= MAX_AUTHOR_CHARS && name.chars().any(char::is_alphabetic))
        .then(|| name.to_string())
}

/// `datetime` attribute, then element text, then the whole container's text.
/// Falls back to `now` when nothing parses.
pub(super) fn extract_timestamp(element: &ElementRef<'_>, now: DateTime<Utc>) -> DateTime<Utc> {
    let from_selectors = DATE_SELECTORS.iter().find_map(|selector| {
        element.select(selector).find_map(|hit| {
            ["datetime", "content"]
                .into_iter()
                .filter_map(|attr| hit.value().attr(attr))
                .find_map(|raw| parse_timestamp(raw, now))
                .or_else(|| parse_timestamp(&element_text(&hit), now))
        })
    });
    from_selectors
        .or_else(|| parse_timestamp(&element_text(element), now))
        .unwrap_or(now)
}
