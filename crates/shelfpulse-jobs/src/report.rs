use serde::{Deserialize, Serialize};
use shelfpulse_sentiment::{CategorySummary, ProductAnalysis};

/// A discovered product that did not make it into the roll-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedProduct {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub summary: CategorySummary,
    pub products: Vec<ProductAnalysis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedProduct>,
}
