use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product link discovered on a search or browse page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCandidate {
    pub name: String,
    pub url: String,
}

/// Where a review came from. Synthetic reviews are never presented as real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOrigin {
    Real,
    Synthetic,
}

impl std::fmt::Display for ReviewOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewOrigin::Real => write!(f, "real"),
            ReviewOrigin::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// One customer review as extracted from a product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    /// Star rating in `[1, 5]`.
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub author: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub origin: ReviewOrigin,
}

impl RawReview {
    /// Text at or below this many characters is not scored for sentiment.
    pub const MIN_TEXT_CHARS: usize = 5;

    pub const MIN_RATING: f64 = 1.0;
    pub const MAX_RATING: f64 = 5.0;

    /// Returns the trimmed review text if it is long enough to score.
    #[must_use]
    pub fn usable_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| t.chars().count() > Self::MIN_TEXT_CHARS)
    }

    /// A review counts only if it carries a rating or scorable text.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rating.is_some() || self.usable_text().is_some()
    }

    /// Accepts a raw rating only when it is finite and inside `[1, 5]`.
    #[must_use]
    pub fn checked_rating(value: f64) -> Option<f64> {
        (value.is_finite() && (Self::MIN_RATING..=Self::MAX_RATING).contains(&value))
            .then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: Option<f64>, text: Option<&str>) -> RawReview {
        RawReview {
            rating,
            text: text.map(str::to_string),
            author: None,
            timestamp: None,
            origin: ReviewOrigin::Real,
        }
    }

    #[test]
    fn rating_only_review_is_valid() {
        assert!(review(Some(4.0), None).is_valid());
    }

    #[test]
    fn text_only_review_is_valid() {
        assert!(review(None, Some("Fresh and crunchy")).is_valid());
    }

    #[test]
    fn short_text_without_rating_is_invalid() {
        let r = review(None, Some("  ok!  "));
        assert!(r.usable_text().is_none());
        assert!(!r.is_valid());
    }

    #[test]
    fn empty_review_is_invalid() {
        assert!(!review(None, None).is_valid());
    }

    #[test]
    fn checked_rating_bounds() {
        assert_eq!(RawReview::checked_rating(1.0), Some(1.0));
        assert_eq!(RawReview::checked_rating(5.0), Some(5.0));
        assert_eq!(RawReview::checked_rating(0.0), None);
        assert_eq!(RawReview::checked_rating(5.5), None);
        assert_eq!(RawReview::checked_rating(f64::NAN), None);
    }

    #[test]
    fn origin_serializes_lowercase() {
        let json = serde_json::to_string(&ReviewOrigin::Synthetic).unwrap();
        assert_eq!(json, "\"synthetic\"");
    }
}
