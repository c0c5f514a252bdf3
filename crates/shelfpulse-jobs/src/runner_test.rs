use async_trait::async_trait;
use shelfpulse_core::{ProductCandidate, RawReview, ReviewOrigin};
use shelfpulse_scraper::{ExtractionOutcome, ReviewExtraction};
use tokio::sync::Notify;

use super::*;
use crate::job::CANCELLED_MESSAGE;
use crate::pipeline::{PipelineSettings, ProductSource, ReviewSource};

/// Returns one product per name, optionally waiting for a release first.
struct Products {
    names: Vec<&'static str>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ProductSource for Products {
    async fn discover(
        &self,
        _category: &Category,
        max_products: usize,
        _time_budget: Duration,
    ) -> Vec<ProductCandidate> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.names
            .iter()
            .take(max_products)
            .map(|name| ProductCandidate {
                name: (*name).to_string(),
                url: format!("https://www.kroger.com/p/{name}/1"),
            })
            .collect()
    }
}

/// Every product gets the same two rating-only reviews, authored per product.
struct Reviews;

#[async_trait]
impl ReviewSource for Reviews {
    async fn extract(&self, product_url: &str, _max_reviews: usize) -> ReviewExtraction {
        let reviews = [5.0, 4.0]
            .into_iter()
            .map(|rating| RawReview {
                rating: Some(rating),
                text: None,
                author: Some(format!("{product_url}#{rating}")),
                timestamp: None,
                origin: ReviewOrigin::Real,
            })
            .collect();
        ReviewExtraction {
            reviews,
            outcome: ExtractionOutcome::Extracted { rule: "fixed" },
        }
    }
}

/// Panics the way a parser bug on hostile page text would.
struct PanickingReviews;

#[async_trait]
impl ReviewSource for PanickingReviews {
    async fn extract(&self, product_url: &str, _max_reviews: usize) -> ReviewExtraction {
        panic!("review parser blew up on {product_url}");
    }
}

fn runner(
    products: Products,
    export_root: &std::path::Path,
    settings: RunnerSettings,
) -> JobRunner {
    runner_with_reviews(products, Arc::new(Reviews), export_root, settings)
}

fn runner_with_reviews(
    products: Products,
    reviews: Arc<dyn ReviewSource>,
    export_root: &std::path::Path,
    settings: RunnerSettings,
) -> JobRunner {
    let pipeline = CategoryPipeline::new(
        Arc::new(products),
        reviews,
        PipelineSettings {
            discovery_budget: Duration::from_secs(5),
            inter_product_delay: Duration::ZERO,
            allow_synthetic: false,
        },
    );
    JobRunner::new(Arc::new(pipeline), CsvExporter::new(export_root), settings)
}

fn default_settings() -> RunnerSettings {
    RunnerSettings {
        job_timeout: Duration::from_secs(900),
        retention: Duration::from_secs(3600),
    }
}

fn category(raw: &str) -> Category {
    Category::parse(raw).unwrap()
}

async fn wait_for(
    runner: &JobRunner,
    id: &Uuid,
    done: impl Fn(&JobSnapshot) -> bool,
) -> JobSnapshot {
    for _ in 0..500 {
        let snapshot = runner.status(id).unwrap();
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never reached the expected state");
}

#[tokio::test]
async fn submitted_job_runs_to_completion_and_exports() {
    let root = tempfile::tempdir().unwrap();
    let runner = runner(
        Products {
            names: vec!["oreo", "chips-ahoy"],
            gate: None,
        },
        root.path(),
        default_settings(),
    );

    let id = runner.submit(category("cookies"), AnalysisLimits::new(2, 5).unwrap());
    let snapshot = wait_for(&runner, &id, |s| s.status.is_terminal()).await;

    assert_eq!(snapshot.status, JobStatus::Completed, "{snapshot:?}");
    assert_eq!(snapshot.progress, 100);
    assert!(snapshot.has_result);
    assert!(snapshot.error.is_none());

    let report = runner.result(&id).unwrap();
    assert_eq!(report.summary.total_products, 2);
    assert_eq!(report.summary.average_rating, Some(4.5));

    let paths = runner
        .registry()
        .with_job(&id, |job| job.export_paths().cloned())
        .flatten()
        .unwrap();
    assert!(paths.summary.exists());
    assert!(paths.products.exists());
    assert!(paths.reviews.exists());
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let runner = runner(
        Products {
            names: vec![],
            gate: None,
        },
        root.path(),
        default_settings(),
    );
    let id = Uuid::new_v4();

    assert!(runner.status(&id).is_none());
    assert!(matches!(runner.result(&id), Err(JobError::NotFound(_))));
    assert!(matches!(runner.cancel(&id), Err(JobError::NotFound(_))));
}

#[tokio::test]
async fn discovery_failure_lands_in_error() {
    let root = tempfile::tempdir().unwrap();
    let runner = runner(
        Products {
            names: vec![],
            gate: None,
        },
        root.path(),
        default_settings(),
    );

    let id = runner.submit(category("kombucha"), AnalysisLimits::default());
    let snapshot = wait_for(&runner, &id, |s| s.status.is_terminal()).await;

    assert_eq!(snapshot.status, JobStatus::Error);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("no products found for category \"kombucha\"")
    );
    assert!(matches!(
        runner.result(&id),
        Err(JobError::NotReady {
            status: JobStatus::Error,
            ..
        })
    ));
}

#[tokio::test]
async fn panicking_worker_lands_in_error() {
    let root = tempfile::tempdir().unwrap();
    let runner = runner_with_reviews(
        Products {
            names: vec!["oreo"],
            gate: None,
        },
        Arc::new(PanickingReviews),
        root.path(),
        default_settings(),
    );

    let id = runner.submit(category("cookies"), AnalysisLimits::default());
    let snapshot = wait_for(&runner, &id, |s| s.status.is_terminal()).await;

    assert_eq!(snapshot.status, JobStatus::Error, "{snapshot:?}");
    assert_eq!(snapshot.error.as_deref(), Some(WORKER_ABORTED_MESSAGE));
    assert!(!snapshot.has_result);
    assert!(!root.path().join(id.to_string()).exists());
}

#[tokio::test]
async fn cancelled_job_stays_cancelled() {
    let root = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let runner = runner(
        Products {
            names: vec!["oreo"],
            gate: Some(Arc::clone(&gate)),
        },
        root.path(),
        default_settings(),
    );

    let id = runner.submit(category("cookies"), AnalysisLimits::default());
    wait_for(&runner, &id, |s| s.status == JobStatus::Searching).await;

    let cancelled = runner.cancel(&id).unwrap();
    assert_eq!(cancelled.status, JobStatus::Error);
    assert_eq!(cancelled.error.as_deref(), Some(CANCELLED_MESSAGE));
    assert_eq!(cancelled.progress, 15);

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = runner.status(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some(CANCELLED_MESSAGE));
    assert!(!snapshot.has_result);
    assert!(!root.path().join(id.to_string()).exists());
    assert!(matches!(
        runner.cancel(&id),
        Err(JobError::AlreadyFinished { .. })
    ));
}

#[tokio::test]
async fn status_check_times_out_stalled_search() {
    let root = tempfile::tempdir().unwrap();
    let runner = runner(
        Products {
            names: vec![],
            gate: None,
        },
        root.path(),
        default_settings(),
    );
    let created = Utc::now() - chrono::Duration::seconds(901);
    let mut job = AnalysisJob::new_at(
        Uuid::new_v4(),
        category("cookies"),
        AnalysisLimits::default(),
        created,
    );
    job.advance(JobStatus::Searching, created);
    let id = runner.registry().insert(job);

    let snapshot = runner.status(&id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Error);
    assert!(snapshot.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn reap_removes_jobs_and_their_exports() {
    let root = tempfile::tempdir().unwrap();
    let runner = runner(
        Products {
            names: vec!["oreo"],
            gate: None,
        },
        root.path(),
        RunnerSettings {
            job_timeout: Duration::from_secs(900),
            retention: Duration::ZERO,
        },
    );

    let id = runner.submit(category("cookies"), AnalysisLimits::default());
    wait_for(&runner, &id, |s| s.status.is_terminal()).await;
    let dir = root.path().join(id.to_string());
    assert!(dir.exists());

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(runner.reap().await, 1);
    assert!(runner.status(&id).is_none());
    assert!(!dir.exists());
}
