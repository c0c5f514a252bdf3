//! One category analysis, end to end.
//!
//! Discovery → per-product review extraction → cross-product dedup →
//! per-product analysis → category roll-up. Products are processed one at a
//! time; the reporter is consulted between stages so a cancelled job stops
//! advancing at the next boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shelfpulse_core::{AnalysisLimits, AppConfig, Category, ProductCandidate};
use shelfpulse_scraper::{
    ContentFetcher, DiscoveryOrchestrator, ExtractionOutcome, HttpFetcher, ReviewExtraction,
    ReviewExtractor, ScraperError, SiteProfile,
};
use shelfpulse_sentiment::{analyze, summarize, ReviewDeduplicator, SentimentError};

use crate::error::JobError;
use crate::job::JobStatus;
use crate::report::{CategoryReport, SkippedProduct};

/// Where candidate products come from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn discover(
        &self,
        category: &Category,
        max_products: usize,
        time_budget: Duration,
    ) -> Vec<ProductCandidate>;
}

#[async_trait]
impl ProductSource for DiscoveryOrchestrator {
    async fn discover(
        &self,
        category: &Category,
        max_products: usize,
        time_budget: Duration,
    ) -> Vec<ProductCandidate> {
        DiscoveryOrchestrator::discover(self, category, max_products, time_budget).await
    }
}

/// Where a product's reviews come from.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn extract(&self, product_url: &str, max_reviews: usize) -> ReviewExtraction;
}

#[async_trait]
impl ReviewSource for ReviewExtractor {
    async fn extract(&self, product_url: &str, max_reviews: usize) -> ReviewExtraction {
        ReviewExtractor::extract(self, product_url, max_reviews).await
    }
}

/// Receives stage changes from a running pipeline.
///
/// An `Err` stops the run at the current boundary.
pub trait StageReporter: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the run should stop.
    fn enter(&self, status: JobStatus) -> Result<(), JobError>;

    /// # Errors
    ///
    /// Returns an error when the run should stop.
    fn products_done(&self, done: usize, total: usize) -> Result<(), JobError>;
}

/// Reporter for runs outside the job registry; it only logs.
pub struct TracingReporter {
    category: Category,
}

impl TracingReporter {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self { category }
    }
}

impl StageReporter for TracingReporter {
    fn enter(&self, status: JobStatus) -> Result<(), JobError> {
        tracing::info!(category = %self.category, status = %status, "pipeline stage");
        Ok(())
    }

    fn products_done(&self, done: usize, total: usize) -> Result<(), JobError> {
        tracing::info!(category = %self.category, done, total, "product processed");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub discovery_budget: Duration,
    /// Base pause between products; the actual pause is jittered ±50 %.
    pub inter_product_delay: Duration,
    pub allow_synthetic: bool,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            discovery_budget: config.discovery_budget(),
            inter_product_delay: config.inter_product_delay(),
            allow_synthetic: config.allow_synthetic_reviews,
        }
    }
}

pub struct CategoryPipeline {
    products: Arc<dyn ProductSource>,
    reviews: Arc<dyn ReviewSource>,
    settings: PipelineSettings,
}

impl CategoryPipeline {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductSource>,
        reviews: Arc<dyn ReviewSource>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            products,
            reviews,
            settings,
        }
    }

    /// Wire the HTTP fetcher, site profile, orchestrator and extractor from config.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the HTTP client cannot be built or the
    /// configured site URL is invalid.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let settings = PipelineSettings::from_app_config(config);
        let fetcher: Arc<dyn ContentFetcher> = Arc::new(HttpFetcher::from_app_config(config)?);
        let site = SiteProfile::from_app_config(config)?;
        let orchestrator = DiscoveryOrchestrator::new(Arc::clone(&fetcher), site);
        let extractor = ReviewExtractor::new(fetcher, settings.allow_synthetic);
        Ok(Self::new(
            Arc::new(orchestrator),
            Arc::new(extractor),
            settings,
        ))
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run discovery and analysis for one category.
    ///
    /// Per-product failures are logged and recorded in
    /// [`CategoryReport::skipped`]; they never abort the run.
    ///
    /// # Errors
    ///
    /// - [`JobError::DiscoveryExhausted`] when discovery finds nothing.
    /// - [`JobError::NoAnalyzableProducts`] when every product was skipped.
    /// - Whatever the reporter returns to stop the run.
    pub async fn run(
        &self,
        category: &Category,
        limits: AnalysisLimits,
        reporter: &dyn StageReporter,
    ) -> Result<CategoryReport, JobError> {
        reporter.enter(JobStatus::Initializing)?;
        reporter.enter(JobStatus::Searching)?;

        let candidates = self
            .products
            .discover(category, limits.max_products, self.settings.discovery_budget)
            .await;
        if candidates.is_empty() {
            return Err(JobError::DiscoveryExhausted {
                category: category.to_string(),
            });
        }

        reporter.enter(JobStatus::Analyzing)?;

        let total = candidates.len();
        let mut dedup = ReviewDeduplicator::new();
        let mut products = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            if index > 0 {
                self.pause().await;
            }

            let extraction = self
                .reviews
                .extract(&candidate.url, limits.max_reviews)
                .await;
            let fetched = extraction.reviews.len();
            let reviews = dedup.dedupe(extraction.reviews, &candidate.name);

            match analyze(candidate, &reviews) {
                Ok(analysis) => {
                    tracing::debug!(
                        product = %candidate.name,
                        fetched,
                        kept = reviews.len(),
                        source = %analysis.data_source,
                        "product analysis ready"
                    );
                    products.push(analysis);
                }
                Err(SentimentError::InputEmpty) => {
                    tracing::warn!(
                        product = %candidate.name,
                        url = %candidate.url,
                        outcome = ?extraction.outcome,
                        "no usable reviews; product excluded"
                    );
                    skipped.push(SkippedProduct {
                        name: candidate.name.clone(),
                        url: candidate.url.clone(),
                        reason: skip_reason(fetched, extraction.outcome),
                    });
                }
                Err(err) => return Err(err.into()),
            }

            reporter.products_done(index + 1, total)?;
        }

        if products.is_empty() {
            return Err(JobError::NoAnalyzableProducts);
        }

        let summary = summarize(category, &products)?;
        tracing::info!(
            category = %category,
            products = summary.total_products,
            reviews = summary.total_reviews,
            skipped = skipped.len(),
            "category analysis complete"
        );
        Ok(CategoryReport {
            summary,
            products,
            skipped,
        })
    }

    async fn pause(&self) {
        let delay = jittered(self.settings.inter_product_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn skip_reason(fetched: usize, outcome: ExtractionOutcome) -> String {
    if fetched > 0 {
        return "all reviews were duplicates or invalid".to_string();
    }
    match outcome {
        ExtractionOutcome::Empty { reason } | ExtractionOutcome::SyntheticFallback { reason } => {
            reason.to_string()
        }
        ExtractionOutcome::Extracted { .. } => "no reviews found".to_string(),
    }
}

/// Scale `base` by a random factor in `[0.5, 1.5)`.
fn jittered(base: Duration) -> Duration {
    if base.is_zero() {
        return base;
    }
    base.mul_f64(rand::random::<f64>() + 0.5)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
