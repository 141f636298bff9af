use std::path::PathBuf;

use crate::page::ExtractionStrategy;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub urls_path: PathBuf,
    /// When unset the built-in retailer registry is used.
    pub retailers_path: Option<PathBuf>,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub crawler_delay_secs: u64,
    pub crawler_timeout_ms: u64,
    pub crawler_user_agent: String,
    pub crawler_max_concurrent: usize,
    pub crawler_max_retries: u32,
    pub crawler_retry_backoff_base_ms: u64,
    pub extraction_strategy: ExtractionStrategy,
    pub extraction_endpoint: Option<String>,
    pub extraction_api_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("urls_path", &self.urls_path)
            .field("retailers_path", &self.retailers_path)
            .field("raw_dir", &self.raw_dir)
            .field("processed_dir", &self.processed_dir)
            .field("crawler_delay_secs", &self.crawler_delay_secs)
            .field("crawler_timeout_ms", &self.crawler_timeout_ms)
            .field("crawler_user_agent", &self.crawler_user_agent)
            .field("crawler_max_concurrent", &self.crawler_max_concurrent)
            .field("crawler_max_retries", &self.crawler_max_retries)
            .field(
                "crawler_retry_backoff_base_ms",
                &self.crawler_retry_backoff_base_ms,
            )
            .field("extraction_strategy", &self.extraction_strategy)
            .field("extraction_endpoint", &self.extraction_endpoint)
            .field(
                "extraction_api_key",
                &self.extraction_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
