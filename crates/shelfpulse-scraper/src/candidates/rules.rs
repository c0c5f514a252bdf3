//! The default product-link rule cascade.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use super::CandidateRule;

/// Rules in priority order: embedded JSON, CSS selectors, raw anchor markup.
pub static DEFAULT_RULES: LazyLock<Vec<CandidateRule>> = LazyLock::new(|| {
    vec![
        pattern(
            "json:href+name",
            r#""href"\s*:\s*"([^"]*\\?/p\\?/[^"]*)"[^}]*?"name"\s*:\s*"([^"]*)""#,
        ),
        pattern(
            "json:url+title",
            r#""url"\s*:\s*"([^"]*\\?/p\\?/[^"]*)"[^}]*?"title"\s*:\s*"([^"]*)""#,
        ),
        pattern(
            "json:link+productName",
            r#""link"\s*:\s*"([^"]*\\?/p\\?/[^"]*)"[^}]*?"productName"\s*:\s*"([^"]*)""#,
        ),
        selector("css:product-href", r#"a[href*="/p/"]"#),
        selector("css:testid-product", r#"[data-testid*="product"] a"#),
        selector("css:ProductCard", ".ProductCard a"),
        selector("css:product-card", ".product-card a"),
        selector("css:aria-product", r#"a[aria-label*="product"]"#),
        selector("css:href-product", r#"a[href*="product"]"#),
        selector("css:kds-link", r#".kds-Link[href*="/p/"]"#),
        selector("css:qa-product", r#"div[data-qa*="product"] a"#),
        pattern(
            "html:anchor-aria-label",
            r#"(?is)<a[^>]+href="([^"]*/p/[^"]*)"[^>]*aria-label="([^"]*)""#,
        ),
        pattern(
            "html:anchor-title",
            r#"(?is)<a[^>]+href="([^"]*/p/[^"]*)"[^>]*title="([^"]*)""#,
        ),
        pattern(
            "html:anchor-text",
            r#"(?is)href="([^"]*/p/[^"]*)"[^>]*>([^<]+)</a>"#,
        ),
    ]
});

/// Descendant lookups used to name an anchor matched by a selector rule,
/// tried after its `aria-label` and `title` attributes.
pub(super) static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "h1, h2, h3, h4, h5",
        r#"[data-testid*="title"]"#,
        ".product-title",
        r#"[class*="title"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

pub(super) static IMAGE_WITH_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("valid selector"));

fn pattern(label: &'static str, re: &str) -> CandidateRule {
    CandidateRule::Pattern {
        label,
        regex: Regex::new(re).expect("valid regex"),
    }
}

fn selector(label: &'static str, css: &str) -> CandidateRule {
    CandidateRule::Selector {
        label,
        selector: Selector::parse(css).expect("valid selector"),
    }
}
