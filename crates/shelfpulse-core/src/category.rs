use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A free-text search category such as `"cookies"`.
///
/// Trimmed, non-empty and at most [`Category::MAX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub const MAX_LEN: usize = 100;

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCategory`] when the trimmed input is empty
    /// or longer than [`Category::MAX_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidCategory(
                "category must not be empty".to_string(),
            ));
        }
        let len = trimmed.chars().count();
        if len > Self::MAX_LEN {
            return Err(CoreError::InvalidCategory(format!(
                "category is {len} characters; the limit is {}",
                Self::MAX_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

/// Per-job bounds on how much work the pipeline does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLimits {
    pub max_products: usize,
    pub max_reviews: usize,
}

impl AnalysisLimits {
    pub const PRODUCTS: RangeInclusive<usize> = 1..=20;
    pub const REVIEWS: RangeInclusive<usize> = 1..=50;

    /// # Errors
    ///
    /// Returns [`CoreError::LimitOutOfRange`] when either value falls outside
    /// [`AnalysisLimits::PRODUCTS`] or [`AnalysisLimits::REVIEWS`].
    pub fn new(max_products: usize, max_reviews: usize) -> Result<Self, CoreError> {
        check_range("max_products", max_products, &Self::PRODUCTS)?;
        check_range("max_reviews", max_reviews, &Self::REVIEWS)?;
        Ok(Self {
            max_products,
            max_reviews,
        })
    }
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_products: 5,
            max_reviews: 10,
        }
    }
}

fn check_range(
    field: &'static str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), CoreError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::LimitOutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
