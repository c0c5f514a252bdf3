//! Category roll-up over per-product analyses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shelfpulse_core::Category;

use crate::analysis::{mean, DataSource, ProductAnalysis, RATING_ONLY_THEME};
use crate::error::SentimentError;
use crate::labels::SentimentLabel;

/// Themes kept for a category.
pub const CATEGORY_THEME_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub name: String,
    pub url: String,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total_products: usize,
    pub total_reviews: usize,
    pub total_text_reviews: usize,
    /// Unweighted mean of product ratings; products without a rating are skipped.
    pub average_rating: Option<f64>,
    /// Unweighted mean of product sentiment.
    pub average_sentiment: f64,
    pub sentiment_label: SentimentLabel,
    pub positive_reviews: usize,
    pub neutral_reviews: usize,
    pub negative_reviews: usize,
    pub top_themes: Vec<String>,
    pub best_product: Option<ProductRef>,
    pub worst_product: Option<ProductRef>,
    /// Products whose data was not purely real.
    pub synthetic_products: usize,
}

/// Roll per-product analyses up into one category summary.
///
/// Every product weighs the same regardless of how many reviews it had.
/// Best and worst ties go to the product seen first.
///
/// # Errors
///
/// Returns [`SentimentError::NoProducts`] when `products` is empty.
pub fn summarize(
    category: &Category,
    products: &[ProductAnalysis],
) -> Result<CategorySummary, SentimentError> {
    if products.is_empty() {
        return Err(SentimentError::NoProducts);
    }

    let ratings: Vec<f64> = products.iter().filter_map(|p| p.average_rating).collect();
    let sentiments: Vec<f64> = products.iter().map(|p| p.average_sentiment).collect();
    let average_sentiment = mean(&sentiments).unwrap_or(0.0);

    let mut best: Option<&ProductAnalysis> = None;
    let mut worst: Option<&ProductAnalysis> = None;
    for product in products {
        let Some(rating) = product.average_rating else {
            continue;
        };
        if best.and_then(|b| b.average_rating).is_none_or(|r| rating > r) {
            best = Some(product);
        }
        if worst.and_then(|w| w.average_rating).is_none_or(|r| rating < r) {
            worst = Some(product);
        }
    }

    Ok(CategorySummary {
        category: category.clone(),
        total_products: products.len(),
        total_reviews: products.iter().map(|p| p.total_reviews).sum(),
        total_text_reviews: products.iter().map(|p| p.text_reviews).sum(),
        average_rating: mean(&ratings),
        average_sentiment,
        sentiment_label: SentimentLabel::from_polarity(average_sentiment),
        positive_reviews: products.iter().map(|p| p.positive_reviews).sum(),
        neutral_reviews: products.iter().map(|p| p.neutral_reviews).sum(),
        negative_reviews: products.iter().map(|p| p.negative_reviews).sum(),
        top_themes: merge_themes(products),
        best_product: best.and_then(product_ref),
        worst_product: worst.and_then(product_ref),
        synthetic_products: products
            .iter()
            .filter(|p| p.data_source != DataSource::Real)
            .count(),
    })
}

fn product_ref(product: &ProductAnalysis) -> Option<ProductRef> {
    product.average_rating.map(|average_rating| ProductRef {
        name: product.product_name.clone(),
        url: product.product_url.clone(),
        average_rating,
    })
}

/// Rank themes by how many products list them; ties keep first-seen order.
fn merge_themes(products: &[ProductAnalysis]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for theme in products.iter().flat_map(|p| p.themes.iter()) {
        if theme == RATING_ONLY_THEME {
            continue;
        }
        let count = counts.entry(theme.as_str()).or_insert(0);
        if *count == 0 {
            order.push(theme.as_str());
        }
        *count += 1;
    }
    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(CATEGORY_THEME_LIMIT)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
