//! Recurring-word theme extraction.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Themes kept per product.
pub const PRODUCT_THEME_LIMIT: usize = 5;

/// Concatenated text shorter than this yields no themes.
const MIN_THEME_TEXT_CHARS: usize = 20;

/// A theme must occur at least this many times.
const MIN_OCCURRENCES: usize = 2;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "be", "been", "have", "has", "had", "will", "would", "could", "should", "may",
    "might", "can", "this", "that", "these", "those", "they", "them", "their", "there", "here",
    "when", "where", "why", "how", "what", "who", "which", "very", "really", "quite", "just",
    "only", "also", "even", "still", "more", "most", "much", "many", "some", "any", "all", "not",
    // Words every review of every product shares.
    "product", "item",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("valid regex"));

/// Top `limit` words across `texts` that occur at least twice.
///
/// Words are lowercased runs of three or more ASCII letters minus stop
/// words. Ties keep first-occurrence order.
pub fn extract_themes<'a>(texts: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let combined = texts.into_iter().collect::<Vec<_>>().join(" ").to_lowercase();
    if combined.trim().chars().count() < MIN_THEME_TEXT_CHARS {
        return Vec::new();
    }

    // word -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, m) in WORD.find_iter(&combined).enumerate() {
        let word = m.as_str();
        if STOP_WORDS.contains(&word) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= MIN_OCCURRENCES)
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _, _)| word.to_string())
        .collect()
}
