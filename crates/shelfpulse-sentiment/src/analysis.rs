//! Per-product sentiment analysis.

use serde::{Deserialize, Serialize};
use shelfpulse_core::{ProductCandidate, RawReview, ReviewOrigin};

use crate::error::SentimentError;
use crate::labels::{SentimentBucket, SentimentLabel};
use crate::scorer::polarity;
use crate::themes::{extract_themes, PRODUCT_THEME_LIMIT};

/// Theme reported for products whose reviews carry ratings but no text.
pub const RATING_ONLY_THEME: &str = "rating-only";

/// Sample reviews kept per bucket.
pub const SAMPLES_PER_BUCKET: usize = 3;

const RATING_MIDPOINT: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Real,
    Synthetic,
    Mixed,
}

impl DataSource {
    fn of(reviews: &[&RawReview]) -> Self {
        let synthetic = reviews
            .iter()
            .filter(|r| r.origin == ReviewOrigin::Synthetic)
            .count();
        match synthetic {
            0 => DataSource::Real,
            n if n == reviews.len() => DataSource::Synthetic,
            _ => DataSource::Mixed,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Real => "real",
            DataSource::Synthetic => "synthetic",
            DataSource::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review with its polarity and bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReview {
    #[serde(flatten)]
    pub review: RawReview,
    pub polarity: f64,
    pub bucket: SentimentBucket,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSamples {
    pub positive: Vec<ScoredReview>,
    pub neutral: Vec<ScoredReview>,
    pub negative: Vec<ScoredReview>,
}

impl SentimentSamples {
    fn offer(&mut self, scored: ScoredReview) {
        let slot = match scored.bucket {
            SentimentBucket::Positive => &mut self.positive,
            SentimentBucket::Neutral => &mut self.neutral,
            SentimentBucket::Negative => &mut self.negative,
        };
        if slot.len() < SAMPLES_PER_BUCKET {
            slot.push(scored);
        }
    }

    /// All samples, positive first.
    pub fn iter(&self) -> impl Iterator<Item = &ScoredReview> {
        self.positive
            .iter()
            .chain(self.neutral.iter())
            .chain(self.negative.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub product_name: String,
    pub product_url: String,
    /// Mean of every present rating, including rating-only reviews.
    pub average_rating: Option<f64>,
    pub total_reviews: usize,
    pub text_reviews: usize,
    pub positive_reviews: usize,
    pub neutral_reviews: usize,
    pub negative_reviews: usize,
    /// Mean polarity over text reviews, or the rating proxy when none had text.
    pub average_sentiment: f64,
    pub sentiment_label: SentimentLabel,
    pub themes: Vec<String>,
    pub samples: SentimentSamples,
    pub data_source: DataSource,
}

impl ProductAnalysis {
    #[must_use]
    pub fn is_rating_only(&self) -> bool {
        self.text_reviews == 0
    }
}

/// Analyze one product's deduplicated reviews.
///
/// Invalid reviews (no rating, no usable text) are ignored. When no review
/// has usable text the polarity is derived from the mean rating as
/// `(rating - 2.5) / 2.5` and the themes list is `["rating-only"]`.
///
/// # Errors
///
/// Returns [`SentimentError::InputEmpty`] when no valid review remains.
pub fn analyze(
    product: &ProductCandidate,
    reviews: &[RawReview],
) -> Result<ProductAnalysis, SentimentError> {
    let valid: Vec<&RawReview> = reviews.iter().filter(|r| r.is_valid()).collect();
    if valid.is_empty() {
        return Err(SentimentError::InputEmpty);
    }

    let ratings: Vec<f64> = valid.iter().filter_map(|r| r.rating).collect();
    let average_rating = mean(&ratings);

    let with_text: Vec<(&RawReview, &str)> = valid
        .iter()
        .filter_map(|r| r.usable_text().map(|t| (*r, t)))
        .collect();

    let mut samples = SentimentSamples::default();
    let mut counts = [0usize; 3];
    let mut record = |review: &RawReview, score: f64| {
        let bucket = SentimentBucket::classify(score);
        counts[bucket_index(bucket)] += 1;
        samples.offer(ScoredReview {
            review: review.clone(),
            polarity: score,
            bucket,
        });
    };

    let (average_sentiment, themes) = if with_text.is_empty() {
        // Valid reviews without text always carry a rating.
        let avg = average_rating.unwrap_or(RATING_MIDPOINT);
        for review in &valid {
            if let Some(rating) = review.rating {
                record(*review, rating_proxy(rating));
            }
        }
        (rating_proxy(avg), vec![RATING_ONLY_THEME.to_string()])
    } else {
        let scores: Vec<f64> = with_text
            .iter()
            .map(|(review, text)| {
                let score = polarity(text);
                record(*review, score);
                score
            })
            .collect();
        let themes = extract_themes(with_text.iter().map(|(_, t)| *t), PRODUCT_THEME_LIMIT);
        (mean(&scores).unwrap_or(0.0), themes)
    };

    let analysis = ProductAnalysis {
        product_name: product.name.clone(),
        product_url: product.url.clone(),
        average_rating,
        total_reviews: valid.len(),
        text_reviews: with_text.len(),
        positive_reviews: counts[bucket_index(SentimentBucket::Positive)],
        neutral_reviews: counts[bucket_index(SentimentBucket::Neutral)],
        negative_reviews: counts[bucket_index(SentimentBucket::Negative)],
        average_sentiment,
        sentiment_label: SentimentLabel::from_polarity(average_sentiment),
        themes,
        samples,
        data_source: DataSource::of(&valid),
    };
    tracing::debug!(
        product = %analysis.product_name,
        reviews = analysis.total_reviews,
        sentiment = analysis.average_sentiment,
        "product analyzed"
    );
    Ok(analysis)
}

fn rating_proxy(rating: f64) -> f64 {
    ((rating - RATING_MIDPOINT) / RATING_MIDPOINT).clamp(-1.0, 1.0)
}

fn bucket_index(bucket: SentimentBucket) -> usize {
    match bucket {
        SentimentBucket::Positive => 0,
        SentimentBucket::Neutral => 1,
        SentimentBucket::Negative => 2,
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    Some(values.iter().sum::<f64>() / len)
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
