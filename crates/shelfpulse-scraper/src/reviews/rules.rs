//! The default review-container rule cascade.

use std::sync::LazyLock;

use scraper::Selector;

use super::ReviewRule;

/// Structured data first, then containers from most to least specific.
pub static DEFAULT_REVIEW_RULES: LazyLock<Vec<ReviewRule>> = LazyLock::new(|| {
    vec![
        ReviewRule::JsonLd { label: "json-ld:review" },
        selector("css:itemprop-review", r#"[itemprop="review"]"#),
        selector("css:bv-content-item", ".bv-content-item"),
        selector(
            "css:testid-review-card",
            r#"[data-testid*="review-card"], [data-testid*="review-item"]"#,
        ),
        selector("css:review-item", r#"[class*="review-item"], [class*="ReviewItem"]"#),
        selector("css:li-review", r#"li[class*="review"]"#),
        selector("css:review", ".review"),
        selector("css:testid-review", r#"[data-testid*="review"]"#),
    ]
});

pub(super) static JSON_LD_SCRIPTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

fn selector(label: &'static str, css: &str) -> ReviewRule {
    ReviewRule::Selector {
        label,
        selector: Selector::parse(css).expect("valid selector"),
    }
}
