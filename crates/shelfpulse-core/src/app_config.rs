use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Retail site origin, without a trailing slash.
    pub site_base_url: String,
    /// Store used to scope search results. `None` disables store-scoped search.
    pub store_id: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub discovery_budget_secs: u64,
    pub job_timeout_secs: u64,
    pub job_retention_secs: u64,
    pub export_dir: PathBuf,
    pub allow_synthetic_reviews: bool,
    pub inter_product_delay_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn discovery_budget(&self) -> Duration {
        Duration::from_secs(self.discovery_budget_secs)
    }

    #[must_use]
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    #[must_use]
    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    #[must_use]
    pub fn inter_product_delay(&self) -> Duration {
        Duration::from_millis(self.inter_product_delay_ms)
    }
}
