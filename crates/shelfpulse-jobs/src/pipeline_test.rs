use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use shelfpulse_core::RawReview;
use shelfpulse_core::ReviewOrigin;
use shelfpulse_scraper::EmptyReason;
use shelfpulse_sentiment::SentimentLabel;

use super::*;

struct FixedProducts {
    products: Vec<ProductCandidate>,
    calls: AtomicUsize,
}

impl FixedProducts {
    fn new(names: &[&str]) -> Self {
        Self {
            products: names
                .iter()
                .map(|name| ProductCandidate {
                    name: (*name).to_string(),
                    url: product_url(name),
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProductSource for FixedProducts {
    async fn discover(
        &self,
        _category: &Category,
        max_products: usize,
        _time_budget: Duration,
    ) -> Vec<ProductCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.products.iter().take(max_products).cloned().collect()
    }
}

#[derive(Default)]
struct FixedReviews {
    by_url: HashMap<String, Vec<RawReview>>,
    requested: Mutex<Vec<String>>,
}

impl FixedReviews {
    fn with(mut self, name: &str, reviews: Vec<RawReview>) -> Self {
        self.by_url.insert(product_url(name), reviews);
        self
    }
}

#[async_trait]
impl ReviewSource for FixedReviews {
    async fn extract(&self, product_url: &str, max_reviews: usize) -> ReviewExtraction {
        self.requested.lock().unwrap().push(product_url.to_string());
        match self.by_url.get(product_url) {
            Some(reviews) => ReviewExtraction {
                reviews: reviews.iter().take(max_reviews).cloned().collect(),
                outcome: ExtractionOutcome::Extracted { rule: "fixed" },
            },
            None => ReviewExtraction {
                reviews: Vec::new(),
                outcome: ExtractionOutcome::Empty {
                    reason: EmptyReason::NoMatch,
                },
            },
        }
    }
}

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<JobStatus>>,
    progress: Mutex<Vec<(usize, usize)>>,
    stop_at: Option<JobStatus>,
}

impl StageReporter for RecordingReporter {
    fn enter(&self, status: JobStatus) -> Result<(), JobError> {
        if self.stop_at == Some(status) {
            return Err(JobError::Halted);
        }
        self.stages.lock().unwrap().push(status);
        Ok(())
    }

    fn products_done(&self, done: usize, total: usize) -> Result<(), JobError> {
        self.progress.lock().unwrap().push((done, total));
        Ok(())
    }
}

fn product_url(name: &str) -> String {
    format!("https://www.kroger.com/p/{}/0001", name.to_lowercase().replace(' ', "-"))
}

fn synthetic(pairs: &[(f64, &str)]) -> Vec<RawReview> {
    pairs
        .iter()
        .map(|&(rating, text)| RawReview {
            rating: Some(rating),
            text: Some(text.to_string()),
            author: Some("Kroger Shopper".to_string()),
            timestamp: None,
            origin: ReviewOrigin::Synthetic,
        })
        .collect()
}

fn alpha_reviews() -> Vec<RawReview> {
    synthetic(&[
        (5.0, "Great quality product! Very fresh and tasty."),
        (4.0, "Good value for the price. Would buy again."),
        (5.0, "Excellent! My family loves this product."),
        (3.0, "It's okay. Average quality for the price."),
    ])
}

fn beta_reviews() -> Vec<RawReview> {
    synthetic(&[
        (2.0, "Not what I expected. Could be better."),
        (1.0, "Stale and bland, really disappointed."),
        (3.0, "Too salty and a bit greasy."),
        (2.0, "Broken cookies, poor packaging."),
    ])
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        discovery_budget: Duration::from_secs(5),
        inter_product_delay: Duration::ZERO,
        allow_synthetic: true,
    }
}

fn pipeline(products: FixedProducts, reviews: FixedReviews) -> CategoryPipeline {
    CategoryPipeline::new(Arc::new(products), Arc::new(reviews), settings())
}

fn cookies() -> Category {
    Category::parse("cookies").unwrap()
}

fn limits(max_products: usize) -> AnalysisLimits {
    AnalysisLimits::new(max_products, 10).unwrap()
}

#[tokio::test]
async fn two_product_cookie_run_ranks_best_and_worst() {
    let reviews = FixedReviews::default()
        .with("Alpha", alpha_reviews())
        .with("Beta", beta_reviews());
    let pipeline = pipeline(FixedProducts::new(&["Alpha", "Beta"]), reviews);
    let reporter = RecordingReporter::default();

    let report = pipeline.run(&cookies(), limits(2), &reporter).await.unwrap();

    let alpha = &report.products[0];
    let beta = &report.products[1];
    assert_eq!(alpha.average_rating, Some(4.25));
    assert!(alpha.sentiment_label >= SentimentLabel::Positive);
    assert_eq!(beta.average_rating, Some(2.0));
    assert!(beta.sentiment_label <= SentimentLabel::Negative);

    let summary = &report.summary;
    assert_eq!(summary.average_rating, Some(3.125));
    assert_eq!(summary.best_product.as_ref().unwrap().name, "Alpha");
    assert_eq!(summary.worst_product.as_ref().unwrap().name, "Beta");
    assert_eq!(summary.synthetic_products, 2);
    assert!(report.skipped.is_empty());

    assert_eq!(
        *reporter.stages.lock().unwrap(),
        vec![
            JobStatus::Initializing,
            JobStatus::Searching,
            JobStatus::Analyzing
        ]
    );
    assert_eq!(*reporter.progress.lock().unwrap(), vec![(1, 2), (2, 2)]);
}

#[tokio::test]
async fn empty_discovery_is_terminal() {
    let reviews = FixedReviews::default();
    let pipeline = CategoryPipeline::new(
        Arc::new(FixedProducts::new(&[])),
        Arc::new(reviews),
        settings(),
    );
    let reporter = RecordingReporter::default();

    let err = pipeline
        .run(&cookies(), limits(5), &reporter)
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::DiscoveryExhausted { ref category } if category == "cookies"));
    assert_eq!(
        *reporter.stages.lock().unwrap(),
        vec![JobStatus::Initializing, JobStatus::Searching]
    );
}

#[tokio::test]
async fn product_without_reviews_is_skipped_not_fatal() {
    let reviews = FixedReviews::default().with("Alpha", alpha_reviews());
    let pipeline = pipeline(FixedProducts::new(&["Alpha", "Ghost"]), reviews);

    let report = pipeline
        .run(&cookies(), limits(2), &RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.summary.total_products, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "Ghost");
    assert_eq!(report.skipped[0].reason, "no reviews matched");
}

#[tokio::test]
async fn every_product_empty_fails_the_run() {
    let pipeline = pipeline(
        FixedProducts::new(&["Ghost", "Phantom"]),
        FixedReviews::default(),
    );
    let err = pipeline
        .run(&cookies(), limits(2), &RecordingReporter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::NoAnalyzableProducts));
    assert_eq!(err.to_string(), "no product had usable reviews");
}

#[tokio::test]
async fn shared_reviews_are_counted_once_across_products() {
    let reviews = FixedReviews::default()
        .with("Alpha", alpha_reviews())
        .with("Clone", alpha_reviews());
    let pipeline = pipeline(FixedProducts::new(&["Alpha", "Clone"]), reviews);

    let report = pipeline
        .run(&cookies(), limits(2), &RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(report.summary.total_reviews, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "Clone");
    assert_eq!(report.skipped[0].reason, "all reviews were duplicates or invalid");
}

#[tokio::test]
async fn max_products_bounds_the_loop() {
    let reviews = Arc::new(
        FixedReviews::default()
            .with("Alpha", alpha_reviews())
            .with("Beta", beta_reviews()),
    );
    let pipeline = CategoryPipeline::new(
        Arc::new(FixedProducts::new(&["Alpha", "Beta"])),
        Arc::clone(&reviews) as Arc<dyn ReviewSource>,
        settings(),
    );

    let report = pipeline
        .run(&cookies(), limits(1), &RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(report.products.len(), 1);
    assert_eq!(
        *reviews.requested.lock().unwrap(),
        vec![product_url("Alpha")]
    );
}

#[tokio::test]
async fn halted_reporter_stops_before_reviews_are_fetched() {
    let reviews = Arc::new(FixedReviews::default().with("Alpha", alpha_reviews()));
    let products = Arc::new(FixedProducts::new(&["Alpha"]));
    let pipeline = CategoryPipeline::new(
        Arc::clone(&products) as Arc<dyn ProductSource>,
        Arc::clone(&reviews) as Arc<dyn ReviewSource>,
        settings(),
    );
    let reporter = RecordingReporter {
        stop_at: Some(JobStatus::Analyzing),
        ..RecordingReporter::default()
    };

    let err = pipeline
        .run(&cookies(), limits(1), &reporter)
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Halted));
    assert_eq!(products.calls.load(Ordering::SeqCst), 1);
    assert!(reviews.requested.lock().unwrap().is_empty());
}

#[test]
fn jitter_stays_within_half_either_side() {
    let base = Duration::from_millis(1000);
    for _ in 0..200 {
        let delay = jittered(base);
        assert!(delay >= Duration::from_millis(500), "{delay:?}");
        assert!(delay < Duration::from_millis(1500), "{delay:?}");
    }
    assert_eq!(jittered(Duration::ZERO), Duration::ZERO);
}
