//! Per-page orchestration: offer source selection, normalization, filtering.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use pricetl_core::{FetchResult, Offer, ProcessedRecord, Product, ProductFields, RecordMetadata};

use crate::fallback::RetailerRegistry;
use crate::normalize::normalize_offer;
use crate::parse::parse_price;

/// Time inputs of a crawl run, read once by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// The day treated as "today" when resolving validity phrases.
    pub reference_date: NaiveDate,
    pub crawled_at: DateTime<Utc>,
}

impl RunContext {
    /// A run whose reference date is the UTC calendar day of `crawled_at`.
    #[must_use]
    pub fn at(crawled_at: DateTime<Utc>) -> Self {
        Self {
            reference_date: crawled_at.date_naive(),
            crawled_at,
        }
    }
}

/// Builds [`ProcessedRecord`]s from fetch results.
#[derive(Debug, Clone, Default)]
pub struct RecordAssembler {
    registry: RetailerRegistry,
}

impl RecordAssembler {
    #[must_use]
    pub fn new(registry: RetailerRegistry) -> Self {
        Self { registry }
    }

    /// Assembles a record using the product fields carried by the fetch itself.
    #[must_use]
    pub fn assemble_fetch(&self, fetch: &FetchResult, run: &RunContext) -> Option<ProcessedRecord> {
        let product = fetch
            .structured
            .as_ref()
            .map(|page| page.product.clone())
            .unwrap_or_default();
        self.assemble(fetch, &product, run, &fetch.url)
    }

    /// Assembles one page's record.
    ///
    /// Returns `None` for a failed fetch. Structured offers are used when
    /// there are any; otherwise offers are recovered from the raw page text.
    /// Offers with neither a retailer name nor a parsed price are dropped,
    /// and exact duplicates collapse to their first occurrence.
    #[must_use]
    pub fn assemble(
        &self,
        fetch: &FetchResult,
        product: &ProductFields,
        run: &RunContext,
        source_url: &str,
    ) -> Option<ProcessedRecord> {
        if !fetch.success {
            return None;
        }

        let structured_offers = fetch
            .structured
            .as_ref()
            .map(|page| page.offers.as_slice())
            .unwrap_or_default();

        let mut name_guess = None;
        let normalized: Vec<Offer> = if structured_offers.is_empty() {
            match fetch.raw_text.as_deref().filter(|t| !t.trim().is_empty()) {
                Some(text) => {
                    let recovered = self.registry.parse(text);
                    debug!(
                        url = %source_url,
                        offers = recovered.offers.len(),
                        "no structured offers, used text fallback"
                    );
                    name_guess = recovered.product_name;
                    recovered
                        .offers
                        .iter()
                        .map(|raw| normalize_offer(raw, run.reference_date))
                        .collect()
                }
                None => Vec::new(),
            }
        } else {
            structured_offers
                .iter()
                .map(|raw| normalize_offer(raw, run.reference_date))
                .collect()
        };

        let total = normalized.len();
        let mut offers: Vec<Offer> = Vec::with_capacity(total);
        for offer in normalized {
            if offer.has_signal() && !offers.contains(&offer) {
                offers.push(offer);
            }
        }
        if offers.len() < total {
            debug!(
                url = %source_url,
                dropped = total - offers.len(),
                "dropped empty or duplicate offers"
            );
        }

        let name = product
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or(name_guess);

        Some(ProcessedRecord {
            product: Product {
                name,
                category: product.breadcrumb(),
                regular_price: product.regular_price_text.as_deref().and_then(parse_price),
            },
            offers,
            metadata: RecordMetadata {
                source_url: source_url.to_string(),
                crawled_at: run.crawled_at,
            },
        })
    }
}
