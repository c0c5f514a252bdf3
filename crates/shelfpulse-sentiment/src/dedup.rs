//! Cross-product review deduplication by content signature.
//!
//! A signature is `(rating bucket, normalized text prefix)`. Reviews without
//! enough text fall back to `(rating bucket, author, product name prefix)`.
//! The deduplicator keeps one running set for a whole analysis run.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use shelfpulse_core::RawReview;

const TEXT_PREFIX_CHARS: usize = 50;
const PRODUCT_PREFIX_CHARS: usize = 20;

/// Normalized text shorter than this is not distinctive enough to key on.
const MIN_SIGNATURE_TEXT_CHARS: usize = 10;

/// Hex SHA-256 of a review's identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewSignature(String);

impl ReviewSignature {
    #[must_use]
    pub fn of(review: &RawReview, product_name: &str) -> Self {
        let bucket = rating_bucket(review.rating);
        let text = review.text.as_deref().map(normalize).unwrap_or_default();
        let key = if text.chars().count() >= MIN_SIGNATURE_TEXT_CHARS {
            format!("text|{bucket}|{}", prefix(&text, TEXT_PREFIX_CHARS))
        } else {
            let author = review.author.as_deref().map(normalize).unwrap_or_default();
            format!(
                "meta|{bucket}|{author}|{}",
                prefix(&normalize(product_name), PRODUCT_PREFIX_CHARS)
            )
        };
        let digest = Sha256::digest(key.as_bytes());
        Self(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn rating_bucket(rating: Option<f64>) -> String {
    match rating {
        #[allow(clippy::cast_possible_truncation)]
        Some(r) => format!("{}", r.round() as i64),
        None => "none".to_string(),
    }
}

/// Lowercase, keep letters, digits and spaces, collapse whitespace.
fn normalize(value: &str) -> String {
    let kept: String = value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn prefix(value: &str, chars: usize) -> String {
    value.chars().take(chars).collect()
}

/// Running signature set shared across every product in one run.
#[derive(Debug, Default)]
pub struct ReviewDeduplicator {
    seen: HashSet<ReviewSignature>,
}

impl ReviewDeduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep reviews whose signature is new and record it.
    pub fn dedupe(&mut self, reviews: Vec<RawReview>, product_name: &str) -> Vec<RawReview> {
        let before = reviews.len();
        let kept: Vec<RawReview> = reviews
            .into_iter()
            .filter(|review| self.seen.insert(ReviewSignature::of(review, product_name)))
            .collect();
        if kept.len() < before {
            tracing::debug!(
                product = product_name,
                dropped = before - kept.len(),
                "dropped duplicate reviews"
            );
        }
        kept
    }

    #[must_use]
    pub fn contains(&self, signature: &ReviewSignature) -> bool {
        self.seen.contains(signature)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
