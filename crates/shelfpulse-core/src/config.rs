use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. Parsing is decoupled from the process
/// environment so tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let env = parse_environment(&or_default("SHELFPULSE_ENV", "development"))?;
    let bind_addr = parse_addr("SHELFPULSE_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("SHELFPULSE_LOG_LEVEL", "info");

    let site_base_url = parse_base_url(&or_default(
        "SHELFPULSE_SITE_BASE_URL",
        "https://www.kroger.com",
    ))?;
    let store_id = Some(or_default("SHELFPULSE_STORE_ID", "01400465"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let request_timeout_secs = parse_u64("SHELFPULSE_REQUEST_TIMEOUT_SECS", "45")?;
    let user_agent = or_default("SHELFPULSE_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("SHELFPULSE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("SHELFPULSE_RETRY_BACKOFF_BASE_MS", "500")?;

    let discovery_budget_secs = parse_u64("SHELFPULSE_DISCOVERY_BUDGET_SECS", "300")?;
    let job_timeout_secs = parse_u64("SHELFPULSE_JOB_TIMEOUT_SECS", "900")?;
    let job_retention_secs = parse_u64("SHELFPULSE_JOB_RETENTION_SECS", "3600")?;
    if job_timeout_secs == 0 {
        return Err(invalid(
            "SHELFPULSE_JOB_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let export_dir = lookup("SHELFPULSE_EXPORT_DIR").map_or_else(
        |_| std::env::temp_dir().join("shelfpulse"),
        PathBuf::from,
    );
    let allow_synthetic_reviews = parse_bool("SHELFPULSE_ALLOW_SYNTHETIC_REVIEWS", "true")?;
    let inter_product_delay_ms = parse_u64("SHELFPULSE_INTER_PRODUCT_DELAY_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        site_base_url,
        store_id,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        discovery_budget_secs,
        job_timeout_secs,
        job_retention_secs,
        export_dir,
        allow_synthetic_reviews,
        inter_product_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHELFPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match host {
        Some(h) if !h.is_empty() && !h.contains('/') => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidEnvVar {
            var: "SHELFPULSE_SITE_BASE_URL".to_string(),
            reason: format!("expected an http(s) origin without a path, got '{raw}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
