//! Site profile: where to search and which URLs count as product pages.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ScraperError;
use crate::text::decode_html;

/// Query-string encoding that leaves RFC 3986 unreserved characters alone.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Default path fragments that mark a product detail page.
const DEFAULT_PRODUCT_PATH_MARKERS: &[&str] = &["/p/", "/product/", "/item/"];

/// Default navigation and utility terms that disqualify a product-shaped URL.
const DEFAULT_URL_DENY_LIST: &[&str] = &[
    "search",
    "category",
    "department",
    "help",
    "account",
    "login",
    "register",
    "cart",
    "checkout",
    "store-locator",
    "recipe",
    "coupon",
    "deals",
    "weekly-ad",
];

#[derive(Debug, Clone)]
pub struct SiteProfile {
    base_url: String,
    host: String,
    domain: String,
    store_id: Option<String>,
    product_path_markers: Vec<String>,
    url_deny_list: Vec<String>,
}

impl SiteProfile {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] unless `base_url` is an
    /// `http(s)://host` origin.
    pub fn new(base_url: &str, store_id: Option<String>) -> Result<Self, ScraperError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let host = host_of(&base_url)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ScraperError::InvalidBaseUrl {
                url: base_url.clone(),
                reason: "expected http(s)://host".to_string(),
            })?
            .to_ascii_lowercase();
        let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();
        Ok(Self {
            base_url,
            host,
            domain,
            store_id: store_id.filter(|s| !s.trim().is_empty()),
            product_path_markers: to_owned_list(DEFAULT_PRODUCT_PATH_MARKERS),
            url_deny_list: to_owned_list(DEFAULT_URL_DENY_LIST),
        })
    }

    /// Replace the path fragments that mark a product page. Matching is
    /// case-insensitive.
    #[must_use]
    pub fn with_product_path_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.product_path_markers = lowercase_list(markers);
        self
    }

    /// Replace the terms that disqualify an otherwise product-shaped URL.
    #[must_use]
    pub fn with_url_deny_list<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.url_deny_list = lowercase_list(terms);
        self
    }

    #[must_use]
    pub fn product_path_markers(&self) -> &[String] {
        &self.product_path_markers
    }

    #[must_use]
    pub fn url_deny_list(&self) -> &[String] {
        &self.url_deny_list
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] for a malformed base URL.
    pub fn from_app_config(config: &shelfpulse_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(&config.site_base_url, config.store_id.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    #[must_use]
    pub fn home_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Search results URL. `store_scoped` adds the configured store, if any.
    #[must_use]
    pub fn search_url(&self, query: &str, store_scoped: bool) -> String {
        let encoded = utf8_percent_encode(query.trim(), QUERY_ENCODE_SET);
        match (store_scoped, self.store_id.as_deref()) {
            (true, Some(store)) => format!(
                "{}/search?query={encoded}&storeId={}",
                self.base_url,
                utf8_percent_encode(store, QUERY_ENCODE_SET)
            ),
            _ => format!("{}/search?query={encoded}", self.base_url),
        }
    }

    /// Department browse URL for a path like `dairy/milk`.
    #[must_use]
    pub fn browse_url(&self, department_path: &str) -> String {
        format!(
            "{}/d/{}",
            self.base_url,
            department_path.trim_matches('/')
        )
    }

    /// Resolve an href found in page content to an absolute URL.
    ///
    /// Handles escaped JSON fragments, protocol-relative and root-relative
    /// links. Fragments are dropped. Returns `None` for anything else
    /// (`javascript:`, `mailto:`, bare relative paths).
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        let decoded = decode_html(href.trim());
        let without_fragment = decoded.split('#').next().unwrap_or_default();
        if without_fragment.is_empty() {
            return None;
        }
        if without_fragment.starts_with("https://") || without_fragment.starts_with("http://") {
            return Some(without_fragment.to_string());
        }
        if let Some(rest) = without_fragment.strip_prefix("//") {
            let scheme = if self.base_url.starts_with("http://") {
                "http"
            } else {
                "https"
            };
            return Some(format!("{scheme}://{rest}"));
        }
        if without_fragment.starts_with('/') {
            return Some(format!("{}{without_fragment}", self.base_url));
        }
        None
    }

    /// True when `url` is an on-site product detail page.
    ///
    /// The host must belong to the site, the path must contain a product
    /// marker and must not contain any navigation or utility term.
    #[must_use]
    pub fn is_product_url(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        if host != self.domain && !host.ends_with(&format!(".{}", self.domain)) {
            return false;
        }
        let path = path_of(url).to_ascii_lowercase();
        self.product_path_markers
            .iter()
            .any(|m| path.contains(m.as_str()))
            && !self.url_deny_list.iter().any(|d| path.contains(d.as_str()))
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn lowercase_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    rest.split(['/', '?', '#']).next()
}

fn path_of(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let path_start = rest.find('/').unwrap_or(rest.len());
    let path = &rest[path_start..];
    path.split(['?', '#']).next().unwrap_or_default()
}
