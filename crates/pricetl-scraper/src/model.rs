//! Model-assisted extraction through an external HTTP endpoint.
//!
//! The endpoint receives the page text and the run's reference date, and
//! answers with an [`ExtractedPage`]-shaped JSON document (optionally wrapped
//! in a list). Relative validity phrases can be pre-resolved by the model
//! into `validity_start_date` / `validity_end_date`.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;

use pricetl_core::ExtractedPage;

use crate::error::ScraperError;

/// Where and how to reach the extraction model.
#[derive(Clone)]
pub struct ModelEndpoint {
    pub url: String,
    pub api_key: Option<String>,
    /// Date the model treats as "today".
    pub reference_date: NaiveDate,
}

impl std::fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("reference_date", &self.reference_date)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ExtractionRequest<'a> {
    url: &'a str,
    text: &'a str,
    reference_date: NaiveDate,
}

/// Sends one page's text to the endpoint and parses the answer.
///
/// # Errors
///
/// - [`ScraperError::RateLimited`] on HTTP 429.
/// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
/// - [`ScraperError::Http`] on network failure.
/// - [`ScraperError::Deserialize`] if the body is not a page document.
pub(crate) async fn request_extraction(
    client: &Client,
    endpoint: &ModelEndpoint,
    page_url: &str,
    text: &str,
) -> Result<Option<ExtractedPage>, ScraperError> {
    let body = ExtractionRequest {
        url: page_url,
        text,
        reference_date: endpoint.reference_date,
    };

    let mut request = client.post(&endpoint.url).json(&body);
    if let Some(key) = endpoint.api_key.as_deref() {
        request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ScraperError::RateLimited {
            url: endpoint.url.clone(),
            retry_after_secs: 60,
        });
    }
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: endpoint.url.clone(),
        });
    }

    let raw = response.text().await?;
    let context = || format!("extraction response for {page_url}");
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| ScraperError::Deserialize {
            context: context(),
            source,
        })?;
    ExtractedPage::from_json(value).map_err(|source| ScraperError::Deserialize {
        context: context(),
        source,
    })
}
