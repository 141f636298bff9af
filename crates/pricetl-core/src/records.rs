//! The processed record model: one product page turned into typed offers.
//!
//! Every value here is built fresh per processed page and never mutated
//! afterwards. Missing information is always an `Option::None`, never a
//! sentinel string.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::page::CategoryLink;

/// Date range during which an offer's price is valid.
///
/// Both boundaries are optional: text that names no resolvable date leaves
/// both empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// The phrase the dates were resolved from, e.g. `"platí do středy 17. 12."`.
    pub source_text: Option<String>,
}

impl ValidityPeriod {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// A price as printed on the page plus whatever could be parsed out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuantity {
    /// Verbatim source text, e.g. `"17,90 Kč / 1 kg"`.
    pub raw_text: String,
    /// `None` whenever `raw_text` holds no numeric token.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    /// Normalized currency code, e.g. `"CZK"`.
    pub currency: Option<String>,
    /// Quantity the price refers to, e.g. `"1 kg"` or `"ks"`.
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountInfo {
    pub raw_text: String,
    pub percentage: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerInfo {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLocationsInfo {
    pub url: Option<String>,
    pub count: Option<u32>,
}

/// One retailer's promotional listing for the tracked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub retailer: RetailerInfo,
    pub pricing: Option<PriceQuantity>,
    pub discount: Option<DiscountInfo>,
    pub validity: ValidityPeriod,
    pub store_locations: StoreLocationsInfo,
    pub flyer_url: Option<String>,
    pub raw_text: Option<String>,
}

impl Offer {
    /// Returns `true` when the offer names a retailer or carries a parsed price.
    ///
    /// Offers failing this check hold no usable signal and are dropped from
    /// a [`ProcessedRecord`].
    #[must_use]
    pub fn has_signal(&self) -> bool {
        let has_retailer = self
            .retailer
            .name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        let has_price = self.pricing.as_ref().is_some_and(|p| p.value.is_some());
        has_retailer || has_price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: Option<String>,
    /// Breadcrumb trail from the most general category to the most specific.
    pub category: Vec<CategoryLink>,
    pub regular_price: Option<PriceQuantity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub source_url: String,
    pub crawled_at: DateTime<Utc>,
}

/// Complete result of processing one product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub product: Product,
    pub offers: Vec<Offer>,
    pub metadata: RecordMetadata,
}

impl ProcessedRecord {
    /// Lowest parsed offer price, if any offer carries one.
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        self.offers
            .iter()
            .filter_map(|o| o.pricing.as_ref().and_then(|p| p.value))
            .min()
    }
}
