//! Shared domain types and configuration for shelfpulse.

pub mod app_config;
pub mod category;
pub mod config;
pub mod reviews;

pub use app_config::{AppConfig, Environment};
pub use category::{AnalysisLimits, Category};
pub use config::{load_app_config, load_app_config_from_env};
pub use reviews::{ProductCandidate, RawReview, ReviewOrigin};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("{field} must be between {min} and {max} (got {value})")]
    LimitOutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
