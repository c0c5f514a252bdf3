use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SentimentError {
    /// No review carried a rating or scorable text.
    #[error("no valid reviews to analyze")]
    InputEmpty,

    #[error("no analyzed products to summarize")]
    NoProducts,
}
