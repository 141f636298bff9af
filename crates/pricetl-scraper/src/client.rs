use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use pricetl_core::{ExtractionStrategy, FetchResult};

use crate::error::ScraperError;
use crate::html::{extract_page, html_to_text};
use crate::model::{request_extraction, ModelEndpoint};
use crate::rate_limit::retry_with_backoff;

/// Source of [`FetchResult`]s for the crawl runner.
///
/// Implementations never fail: every error is reported through an
/// unsuccessful result so one bad URL cannot stop a batch.
pub trait PageFetcher {
    fn fetch(
        &self,
        url: &str,
        strategy: ExtractionStrategy,
    ) -> impl Future<Output = FetchResult> + Send;
}

/// HTTP page fetcher backed by `reqwest`.
///
/// Transient errors (network failures, 429, 5xx) are retried with
/// exponential backoff and jitter up to `max_retries` additional attempts.
pub struct PageClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^(attempt - 1)`,
    /// capped at 60 s before jitter.
    backoff_base_ms: u64,
    model: Option<ModelEndpoint>,
}

impl PageClient {
    /// Creates a client with the given timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_ms: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("cs-CZ,cs;q=0.9"),
        );
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
            model: None,
        })
    }

    /// Enables [`ExtractionStrategy::ModelAssisted`] against `endpoint`.
    #[must_use]
    pub fn with_model_endpoint(mut self, endpoint: ModelEndpoint) -> Self {
        self.model = Some(endpoint);
        self
    }

    /// Downloads the page body, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    url: url.to_owned(),
                    retry_after_secs,
                });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: url.to_owned(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }

    async fn fetch_with(
        &self,
        url: &str,
        strategy: ExtractionStrategy,
    ) -> Result<FetchResult, ScraperError> {
        if strategy == ExtractionStrategy::ModelAssisted && self.model.is_none() {
            return Err(ScraperError::MissingEndpoint);
        }
        let html = self.fetch_html(url).await?;
        let text = html_to_text(&html);

        let structured = match strategy {
            ExtractionStrategy::Selector => Some(extract_page(&html)),
            ExtractionStrategy::ModelAssisted => {
                let endpoint = self.model.as_ref().ok_or(ScraperError::MissingEndpoint)?;
                retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                    request_extraction(&self.client, endpoint, url, &text)
                })
                .await?
            }
            ExtractionStrategy::TextOnly => None,
        };

        Ok(FetchResult::success(url, structured, Some(text)))
    }
}

impl PageFetcher for PageClient {
    async fn fetch(&self, url: &str, strategy: ExtractionStrategy) -> FetchResult {
        match self.fetch_with(url, strategy).await {
            Ok(result) => {
                tracing::debug!(
                    url,
                    %strategy,
                    offers = result.structured.as_ref().map_or(0, |p| p.offers.len()),
                    "page fetched"
                );
                result
            }
            Err(e) => {
                tracing::warn!(url, %strategy, error = %e, "page fetch failed");
                FetchResult::failure(url, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_client() {
        assert!(PageClient::new(5_000, "pricetl-test/0.1", 0, 0).is_ok());
    }
}
