//! `probe`: site reachability diagnostics.

use shelfpulse_core::{AppConfig, Category};
use shelfpulse_scraper::{probe_site, HttpFetcher, ProbeResult, ProbeStatus, SiteProfile};

pub(crate) async fn run_probe(config: &AppConfig, category: &str) -> anyhow::Result<()> {
    let category = Category::parse(category)?;
    let fetcher = HttpFetcher::from_app_config(config)?;
    let site = SiteProfile::from_app_config(config)?;

    let results = probe_site(&fetcher, &site, &category).await;
    for result in &results {
        println!("{}", describe(result));
    }

    let reachable = results.iter().filter(|r| r.is_ok()).count();
    let listings = results.iter().filter(|r| r.looks_like_listing()).count();
    println!(
        "{reachable}/{} pages reachable, {listings} look like product listings",
        results.len()
    );
    Ok(())
}

fn describe(result: &ProbeResult) -> String {
    match &result.status {
        ProbeStatus::Ok {
            bytes,
            indicators,
            product_links,
        } => format!(
            "ok       {:<24} {bytes} bytes, {indicators} indicators, {product_links} product links",
            result.target.label
        ),
        ProbeStatus::Failed { kind, detail } => {
            format!("{kind:<8} {:<24} {detail}", result.target.label)
        }
    }
}
