//! CSV export of a finished [`CategoryReport`].
//!
//! Three views: the category summary as `Metric,Value` rows, one row per
//! product, and the sampled reviews flattened with their product and
//! sentiment bucket. Every view carries the real/synthetic flag.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shelfpulse_sentiment::{ProductAnalysis, ProductRef, ScoredReview, SentimentBucket};
use uuid::Uuid;

use crate::error::ExportError;
use crate::report::CategoryReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportView {
    Summary,
    Products,
    Reviews,
}

impl ExportView {
    pub const ALL: [ExportView; 3] = [
        ExportView::Summary,
        ExportView::Products,
        ExportView::Reviews,
    ];

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "summary" => Some(ExportView::Summary),
            "products" => Some(ExportView::Products),
            "reviews" => Some(ExportView::Reviews),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExportView::Summary => "summary",
            ExportView::Products => "products",
            ExportView::Reviews => "reviews",
        }
    }

    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl std::fmt::Display for ExportView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files written for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPaths {
    pub dir: PathBuf,
    pub summary: PathBuf,
    pub products: PathBuf,
    pub reviews: PathBuf,
}

impl ExportPaths {
    fn in_dir(dir: PathBuf) -> Self {
        Self {
            summary: dir.join(ExportView::Summary.file_name()),
            products: dir.join(ExportView::Products.file_name()),
            reviews: dir.join(ExportView::Reviews.file_name()),
            dir,
        }
    }

    #[must_use]
    pub fn path(&self, view: ExportView) -> &Path {
        match view {
            ExportView::Summary => &self.summary,
            ExportView::Products => &self.products,
            ExportView::Reviews => &self.reviews,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvExporter {
    root: PathBuf,
}

impl CsvExporter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write all three views under `<root>/<job id>/`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the directory or any file cannot be written.
    pub async fn write_all(
        &self,
        job_id: Uuid,
        report: Arc<CategoryReport>,
    ) -> Result<ExportPaths, ExportError> {
        let paths = ExportPaths::in_dir(self.root.join(job_id.to_string()));
        let target = paths.clone();
        tokio::task::spawn_blocking(move || write_files(&target, &report))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))??;
        tracing::info!(job_id = %job_id, dir = %paths.dir.display(), "export written");
        Ok(paths)
    }

    /// Delete a job's export directory. A directory that is already gone is fine.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] for any other filesystem failure.
    pub async fn remove(&self, paths: &ExportPaths) -> Result<(), ExportError> {
        match tokio::fs::remove_dir_all(&paths.dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn write_files(paths: &ExportPaths, report: &CategoryReport) -> Result<(), ExportError> {
    std::fs::create_dir_all(&paths.dir)?;
    for view in ExportView::ALL {
        let mut writer = csv::Writer::from_path(paths.path(view))?;
        write_view(&mut writer, view, report)?;
        writer.flush()?;
    }
    Ok(())
}

/// Render one view to CSV bytes.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails.
pub fn render(view: ExportView, report: &CategoryReport) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_view(&mut writer, view, report)?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

fn write_view<W: Write>(
    writer: &mut csv::Writer<W>,
    view: ExportView,
    report: &CategoryReport,
) -> Result<(), csv::Error> {
    match view {
        ExportView::Summary => write_summary(writer, report),
        ExportView::Products => write_products(writer, &report.products),
        ExportView::Reviews => write_reviews(writer, &report.products),
    }
}

fn write_summary<W: Write>(
    writer: &mut csv::Writer<W>,
    report: &CategoryReport,
) -> Result<(), csv::Error> {
    let s = &report.summary;
    let best = s.best_product.as_ref();
    let worst = s.worst_product.as_ref();
    let rows: [(&str, String); 16] = [
        ("Category", s.category.to_string()),
        ("Total Products Analyzed", s.total_products.to_string()),
        ("Total Reviews", s.total_reviews.to_string()),
        ("Total Text Reviews", s.total_text_reviews.to_string()),
        ("Average Rating", rating_cell(s.average_rating)),
        ("Average Sentiment Score", format!("{:.3}", s.average_sentiment)),
        ("Overall Sentiment", s.sentiment_label.to_string()),
        ("Positive Reviews", s.positive_reviews.to_string()),
        ("Neutral Reviews", s.neutral_reviews.to_string()),
        ("Negative Reviews", s.negative_reviews.to_string()),
        ("Top Themes", s.top_themes.join(", ")),
        ("Best Product", ref_name(best)),
        ("Best Product Rating", rating_cell(best.map(|p| p.average_rating))),
        ("Worst Product", ref_name(worst)),
        ("Worst Product Rating", rating_cell(worst.map(|p| p.average_rating))),
        ("Synthetic Products", s.synthetic_products.to_string()),
    ];

    writer.write_record(["Metric", "Value"])?;
    for (metric, value) in rows {
        writer.write_record([metric, value.as_str()])?;
    }
    Ok(())
}

fn write_products<W: Write>(
    writer: &mut csv::Writer<W>,
    products: &[ProductAnalysis],
) -> Result<(), csv::Error> {
    writer.write_record([
        "Product Name",
        "Average Rating",
        "Total Reviews",
        "Text Reviews",
        "Sentiment Score",
        "Sentiment Label",
        "Positive Reviews",
        "Negative Reviews",
        "Neutral Reviews",
        "Top Themes",
        "Product URL",
        "Data Source",
    ])?;
    for p in products {
        writer.write_record([
            p.product_name.clone(),
            rating_cell(p.average_rating),
            p.total_reviews.to_string(),
            p.text_reviews.to_string(),
            format!("{:.3}", p.average_sentiment),
            p.sentiment_label.to_string(),
            p.positive_reviews.to_string(),
            p.negative_reviews.to_string(),
            p.neutral_reviews.to_string(),
            p.themes.join(", "),
            p.product_url.clone(),
            p.data_source.to_string(),
        ])?;
    }
    Ok(())
}

fn write_reviews<W: Write>(
    writer: &mut csv::Writer<W>,
    products: &[ProductAnalysis],
) -> Result<(), csv::Error> {
    writer.write_record([
        "Product Name",
        "Sentiment Category",
        "Rating",
        "Review Text",
        "Author",
        "Source",
    ])?;
    for p in products {
        let buckets: [(&[ScoredReview], SentimentBucket); 3] = [
            (p.samples.positive.as_slice(), SentimentBucket::Positive),
            (p.samples.negative.as_slice(), SentimentBucket::Negative),
            (p.samples.neutral.as_slice(), SentimentBucket::Neutral),
        ];
        for (samples, bucket) in buckets {
            for scored in samples {
                let review = &scored.review;
                let rating = rating_cell(review.rating);
                let origin = review.origin.to_string();
                writer.write_record([
                    p.product_name.as_str(),
                    bucket_title(bucket),
                    rating.as_str(),
                    review.text.as_deref().unwrap_or_default(),
                    review.author.as_deref().unwrap_or_default(),
                    origin.as_str(),
                ])?;
            }
        }
    }
    Ok(())
}

fn rating_cell(rating: Option<f64>) -> String {
    rating.map(|r| format!("{r:.2}")).unwrap_or_default()
}

fn ref_name(product: Option<&ProductRef>) -> String {
    product.map(|p| p.name.clone()).unwrap_or_default()
}

fn bucket_title(bucket: SentimentBucket) -> &'static str {
    match bucket {
        SentimentBucket::Positive => "Positive",
        SentimentBucket::Neutral => "Neutral",
        SentimentBucket::Negative => "Negative",
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
