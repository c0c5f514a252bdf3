use shelfpulse_core::{ProductCandidate, RawReview, ReviewOrigin};

use super::*;
use crate::analysis::analyze;

fn candidate(name: &str) -> ProductCandidate {
    ProductCandidate {
        name: name.to_string(),
        url: format!("https://www.kroger.com/p/{}/1", name.to_lowercase()),
    }
}

fn reviews(pairs: &[(f64, &str)], origin: ReviewOrigin) -> Vec<RawReview> {
    pairs
        .iter()
        .map(|&(rating, text)| RawReview {
            rating: Some(rating),
            text: Some(text.to_string()),
            author: None,
            timestamp: None,
            origin,
        })
        .collect()
}

fn rated_only(name: &str, ratings: &[f64]) -> ProductAnalysis {
    let reviews: Vec<RawReview> = ratings
        .iter()
        .map(|&r| RawReview {
            rating: Some(r),
            text: None,
            author: None,
            timestamp: None,
            origin: ReviewOrigin::Real,
        })
        .collect();
    analyze(&candidate(name), &reviews).unwrap()
}

fn cookies() -> Category {
    Category::parse("cookies").unwrap()
}

#[test]
fn empty_product_list_is_an_error() {
    assert_eq!(summarize(&cookies(), &[]), Err(SentimentError::NoProducts));
}

#[test]
fn two_product_cookie_scenario() {
    let a = analyze(
        &candidate("Alpha"),
        &reviews(
            &[
                (5.0, "Great quality product! Very fresh and tasty."),
                (4.0, "Good value for the price. Would buy again."),
                (5.0, "Excellent! My family loves this product."),
                (3.0, "It's okay. Average quality for the price."),
            ],
            ReviewOrigin::Synthetic,
        ),
    )
    .unwrap();
    let b = analyze(
        &candidate("Beta"),
        &reviews(
            &[
                (2.0, "Not what I expected. Could be better."),
                (1.0, "Stale and bland, really disappointed."),
                (3.0, "Too salty and a bit greasy."),
                (2.0, "Broken cookies, poor packaging."),
            ],
            ReviewOrigin::Synthetic,
        ),
    )
    .unwrap();

    assert_eq!(a.average_rating, Some(4.25));
    assert!(a.average_sentiment > 0.1, "A sentiment {}", a.average_sentiment);
    assert!(a.sentiment_label >= SentimentLabel::Positive);
    assert_eq!(b.average_rating, Some(2.0));
    assert!(b.average_sentiment < -0.1, "B sentiment {}", b.average_sentiment);
    assert!(b.sentiment_label <= SentimentLabel::Negative);

    let summary = summarize(&cookies(), &[a, b]).unwrap();
    assert_eq!(summary.average_rating, Some(3.125));
    assert_eq!(summary.best_product.unwrap().name, "Alpha");
    assert_eq!(summary.worst_product.unwrap().name, "Beta");
    assert_eq!(summary.total_reviews, 8);
    assert_eq!(summary.synthetic_products, 2);
}

#[test]
fn category_rating_is_unweighted_by_review_count() {
    let small = rated_only("Small", &[5.0, 5.0]);
    let large = rated_only("Large", &[1.0; 50]);
    let summary = summarize(&cookies(), &[small, large]).unwrap();
    assert_eq!(summary.average_rating, Some(3.0));
    assert_eq!(summary.total_reviews, 52);
}

#[test]
fn counts_are_summed_across_products() {
    let a = rated_only("A", &[5.0, 4.0]);
    let b = rated_only("B", &[1.0]);
    let summary = summarize(&cookies(), &[a, b]).unwrap();
    assert_eq!(summary.positive_reviews, 2);
    assert_eq!(summary.negative_reviews, 1);
    assert_eq!(summary.neutral_reviews, 0);
    assert_eq!(summary.synthetic_products, 0);
}

#[test]
fn best_and_worst_ties_go_to_first_encountered() {
    let first = rated_only("First", &[4.0]);
    let second = rated_only("Second", &[4.0]);
    let summary = summarize(&cookies(), &[first, second]).unwrap();
    assert_eq!(summary.best_product.unwrap().name, "First");
    assert_eq!(summary.worst_product.unwrap().name, "First");
}

#[test]
fn rating_only_sentinel_is_not_a_category_theme() {
    let mut a = rated_only("A", &[4.0]);
    a.themes = vec!["rating-only".to_string()];
    let mut b = rated_only("B", &[4.0]);
    b.themes = vec!["fresh".to_string(), "crunchy".to_string()];
    let mut c = rated_only("C", &[4.0]);
    c.themes = vec!["crunchy".to_string(), "sweet".to_string()];

    let summary = summarize(&cookies(), &[a, b, c]).unwrap();
    assert_eq!(summary.top_themes, vec!["crunchy", "fresh", "sweet"]);
}

#[test]
fn theme_list_is_capped() {
    let products: Vec<ProductAnalysis> = (0..3)
        .map(|i| {
            let mut p = rated_only(&format!("P{i}"), &[3.0]);
            p.themes = (0..5).map(|t| format!("theme{}", i * 5 + t)).collect();
            p
        })
        .collect();
    let summary = summarize(&cookies(), &products).unwrap();
    assert_eq!(summary.top_themes.len(), CATEGORY_THEME_LIMIT);
    assert_eq!(summary.top_themes[0], "theme0");
}
