//! Review sentiment scoring and aggregation for shelfpulse.
//!
//! Scores review text with a grocery-domain lexicon, deduplicates reviews
//! across products by content signature, and rolls per-product analyses up
//! into a category summary.

pub mod analysis;
pub mod dedup;
pub mod error;
pub mod labels;
pub mod scorer;
pub mod summary;
pub mod themes;

pub use analysis::{analyze, DataSource, ProductAnalysis, ScoredReview, SentimentSamples};
pub use dedup::{ReviewDeduplicator, ReviewSignature};
pub use error::SentimentError;
pub use labels::{SentimentBucket, SentimentLabel};
pub use scorer::polarity;
pub use summary::{summarize, CategorySummary, ProductRef};
pub use themes::extract_themes;
