use crate::app_config::{AppConfig, Environment};
use crate::page::ExtractionStrategy;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
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
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PRICETL_ENV", "development"));
    let log_level = or_default("PRICETL_LOG_LEVEL", "info");
    let urls_path = PathBuf::from(or_default("PRICETL_URLS_PATH", "./config/urls.txt"));
    let retailers_path = optional("PRICETL_RETAILERS_PATH").map(PathBuf::from);
    let raw_dir = PathBuf::from(or_default("PRICETL_RAW_DIR", "./data/raw"));
    let processed_dir = PathBuf::from(or_default("PRICETL_PROCESSED_DIR", "./data/processed"));

    let crawler_delay_secs = parse_u64("PRICETL_CRAWLER_DELAY_SECONDS", "2")?;
    let crawler_timeout_ms = parse_u64("PRICETL_CRAWLER_TIMEOUT_MS", "60000")?;
    let crawler_user_agent = or_default(
        "PRICETL_CRAWLER_USER_AGENT",
        "pricetl/0.1 (price-timeline)",
    );
    let crawler_max_concurrent = parse_usize("PRICETL_CRAWLER_MAX_CONCURRENT", "1")?;
    let crawler_max_retries = parse_u32("PRICETL_CRAWLER_MAX_RETRIES", "3")?;
    let crawler_retry_backoff_base_ms =
        parse_u64("PRICETL_CRAWLER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let extraction_strategy = or_default("PRICETL_EXTRACTION_STRATEGY", "selector")
        .parse::<ExtractionStrategy>()
        .map_err(|reason| invalid("PRICETL_EXTRACTION_STRATEGY", reason))?;
    let extraction_endpoint = optional("PRICETL_EXTRACTION_ENDPOINT");
    let extraction_api_key = optional("PRICETL_EXTRACTION_API_KEY");

    Ok(AppConfig {
        env,
        log_level,
        urls_path,
        retailers_path,
        raw_dir,
        processed_dir,
        crawler_delay_secs,
        crawler_timeout_ms,
        crawler_user_agent,
        crawler_max_concurrent,
        crawler_max_retries,
        crawler_retry_backoff_base_ms,
        extraction_strategy,
        extraction_endpoint,
        extraction_api_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
