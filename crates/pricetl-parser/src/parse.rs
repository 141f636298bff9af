//! Field-level sub-parsers for price, discount and store-count text.
//!
//! Each parser is total: a text without the expected numeric token yields a
//! value of `None` while the raw text is preserved.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use pricetl_core::{DiscountInfo, PriceQuantity};

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid decimal regex"));

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*%").expect("valid percent regex"));

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// Currency tokens, matched case-insensitively against the price text.
const CURRENCIES: &[(&str, &str)] = &[("kč", "CZK"), ("czk", "CZK"), ("€", "EUR"), ("eur", "EUR")];

/// Parses a price fragment such as `"17,90 Kč / 1 kg"`.
///
/// Returns `None` only for blank input. The first decimal-like token becomes
/// `value` (comma normalized to a dot), `currency` comes from a small fixed
/// vocabulary, and `unit` is whatever follows the first `/`.
#[must_use]
pub fn parse_price(text: &str) -> Option<PriceQuantity> {
    let raw = text.trim();
    if raw.is_empty() {
        return None;
    }

    let value = DECIMAL_RE
        .find(raw)
        .and_then(|m| Decimal::from_str(&m.as_str().replace(',', ".")).ok());

    let lower = raw.to_lowercase();
    let currency = CURRENCIES
        .iter()
        .find(|(token, _)| lower.contains(*token))
        .map(|(_, code)| (*code).to_string());

    let unit = raw
        .split_once('/')
        .map(|(_, after)| after.trim())
        .filter(|after| !after.is_empty())
        .map(str::to_string);

    Some(PriceQuantity {
        raw_text: raw.to_string(),
        value,
        currency,
        unit,
    })
}

/// Parses a discount fragment such as `"–55 %"`.
///
/// The sign prefix is ignored; `percentage` is the integer right before `%`.
#[must_use]
pub fn parse_discount(text: &str) -> Option<DiscountInfo> {
    let raw = text.trim();
    if raw.is_empty() {
        return None;
    }

    let percentage = PERCENT_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    Some(DiscountInfo {
        raw_text: raw.to_string(),
        percentage,
    })
}

/// First integer in `text`, e.g. `81` from `"81 nejbližších poboček"`.
#[must_use]
pub fn parse_store_count(text: &str) -> Option<u32> {
    INTEGER_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
