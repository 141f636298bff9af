//! Conversion of one extractor-produced [`RawOffer`] into a typed [`Offer`].

use chrono::NaiveDate;

use pricetl_core::{Offer, RawOffer, RetailerInfo, StoreLocationsInfo, ValidityPeriod};

use crate::dates::{find_validity_phrase, resolve_validity};
use crate::parse::{parse_discount, parse_price, parse_store_count};

/// Normalizes a raw offer against the run's reference date.
///
/// Every field is trimmed and blank strings become `None`. Validity comes
/// from `validity_text`, or from a phrase found inside `full_text` when the
/// extractor supplied none. Pre-resolved ISO dates on the raw offer fill a
/// boundary only when the text resolved nothing for it.
///
/// The returned offer may carry no usable signal; see [`Offer::has_signal`].
#[must_use]
pub fn normalize_offer(raw: &RawOffer, reference_date: NaiveDate) -> Offer {
    let full_text = clean(raw.full_text.as_deref());

    let validity_text = clean(raw.validity_text.as_deref())
        .or_else(|| full_text.as_deref().and_then(find_validity_phrase));
    let mut validity = validity_text
        .as_deref()
        .map(|text| resolve_validity(text, reference_date))
        .unwrap_or_default();
    fill_iso_boundaries(&mut validity, raw);

    Offer {
        retailer: RetailerInfo {
            name: clean(raw.retailer_name.as_deref()),
            url: clean(raw.retailer_url.as_deref()),
        },
        pricing: raw.price_text.as_deref().and_then(parse_price),
        discount: raw.discount_text.as_deref().and_then(parse_discount),
        validity,
        store_locations: StoreLocationsInfo {
            url: clean(raw.store_locations_url.as_deref()),
            count: raw.store_count_text.as_deref().and_then(parse_store_count),
        },
        flyer_url: clean(raw.flyer_url.as_deref()),
        raw_text: full_text,
    }
}

fn fill_iso_boundaries(validity: &mut ValidityPeriod, raw: &RawOffer) {
    if validity.start_date.is_none() {
        validity.start_date = iso_date(raw.validity_start_date.as_deref());
    }
    if validity.end_date.is_none() {
        validity.end_date = iso_date(raw.validity_end_date.as_deref());
    }
}

fn iso_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
