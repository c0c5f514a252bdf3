//! One-shot category analysis without the job server.

use std::sync::Arc;

use shelfpulse_core::{AnalysisLimits, AppConfig, Category};
use shelfpulse_jobs::{CategoryPipeline, CategoryReport, CsvExporter, TracingReporter};
use uuid::Uuid;

/// Run the pipeline in the foreground, write the three CSV views and print a
/// short summary.
///
/// # Errors
///
/// Returns an error for invalid input, when no product could be discovered
/// or analyzed, or when the export cannot be written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    category: &str,
    max_products: usize,
    max_reviews: usize,
) -> anyhow::Result<()> {
    let category = Category::parse(category)?;
    let limits = AnalysisLimits::new(max_products, max_reviews)?;
    let pipeline = CategoryPipeline::from_app_config(config)?;

    let report = pipeline
        .run(&category, limits, &TracingReporter::new(category.clone()))
        .await?;
    let report = Arc::new(report);

    let exporter = CsvExporter::new(config.export_dir.clone());
    let paths = exporter.write_all(Uuid::new_v4(), Arc::clone(&report)).await?;

    for line in summary_lines(&report) {
        println!("{line}");
    }
    println!("exports written to {}", paths.dir.display());
    Ok(())
}

fn summary_lines(report: &CategoryReport) -> Vec<String> {
    let summary = &report.summary;
    let mut lines = vec![
        format!(
            "{}: {} products, {} reviews ({} with text)",
            summary.category,
            summary.total_products,
            summary.total_reviews,
            summary.total_text_reviews
        ),
        format!(
            "sentiment {:.3} ({}); positive {} / neutral {} / negative {}",
            summary.average_sentiment,
            summary.sentiment_label,
            summary.positive_reviews,
            summary.neutral_reviews,
            summary.negative_reviews
        ),
    ];
    if let Some(rating) = summary.average_rating {
        lines.push(format!("average rating {rating:.2}"));
    }
    if let Some(best) = &summary.best_product {
        lines.push(format!("best:  {} ({:.2})", best.name, best.average_rating));
    }
    if let Some(worst) = &summary.worst_product {
        lines.push(format!("worst: {} ({:.2})", worst.name, worst.average_rating));
    }
    if !summary.top_themes.is_empty() {
        lines.push(format!("themes: {}", summary.top_themes.join(", ")));
    }
    if summary.synthetic_products > 0 {
        lines.push(format!(
            "note: {} product(s) used synthetic sample reviews",
            summary.synthetic_products
        ));
    }
    for skipped in &report.skipped {
        lines.push(format!("skipped {}: {}", skipped.name, skipped.reason));
    }
    lines
}
