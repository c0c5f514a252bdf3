//! Labelled stand-in reviews for products whose page yielded nothing.
//!
//! Every review produced here carries [`ReviewOrigin::Synthetic`]. Selection
//! is seeded from the product URL so repeated runs produce the same set.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use shelfpulse_core::{RawReview, ReviewOrigin};

const TEMPLATES: &[(f64, &str, &str)] = &[
    (5.0, "Great quality product! Very fresh and tasty.", "LocalCustomer1"),
    (4.0, "Good value for the price. Would buy again.", "LocalCustomer2"),
    (5.0, "Excellent! My family loves this product.", "LocalCustomer3"),
    (3.0, "It's okay. Average quality for the price.", "LocalCustomer4"),
    (4.0, "Pretty good. Fresh and well-packaged.", "LocalCustomer5"),
    (5.0, "Perfect for our needs. Highly recommend!", "LocalCustomer6"),
    (2.0, "Not what I expected. Could be better.", "LocalCustomer7"),
    (4.0, "Good product overall. Meets expectations.", "LocalCustomer8"),
];

/// Size of the template pool; at most this many synthetic reviews per product.
pub const TEMPLATE_COUNT: usize = TEMPLATES.len();

/// Up to `max_reviews` templated reviews for `product_url`.
#[must_use]
pub fn synthetic_reviews(product_url: &str, max_reviews: usize, now: DateTime<Utc>) -> Vec<RawReview> {
    let mut rng = StdRng::seed_from_u64(seed_for(product_url));
    TEMPLATES
        .choose_multiple(&mut rng, max_reviews.min(TEMPLATE_COUNT))
        .map(|&(rating, text, author)| RawReview {
            rating: Some(rating),
            text: Some(text.to_string()),
            author: Some(author.to_string()),
            timestamp: Some(now),
            origin: ReviewOrigin::Synthetic,
        })
        .collect()
}

fn seed_for(product_url: &str) -> u64 {
    let digest = Sha256::digest(product_url.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
