//! Regex recovery of offers from unstructured page text.
//!
//! Used only when structured extraction produced no offers. Every retailer in
//! the [`RetailerRegistry`] owns one compiled composite pattern; each match of
//! that pattern becomes a [`RawOffer`]. A miss simply produces fewer offers.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use pricetl_core::{default_retailers, RawOffer, RetailerConfig};

use crate::error::RegistryError;
use crate::parse::parse_price;

/// Longest validity phrase kept from a text match, in characters.
const MAX_VALIDITY_CHARS: usize = 50;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)Aktuální akční slevy ([^\n]+?)(?:\s+\d+(?:[.,]\d+)?\s*(?:kg|g|ks|l|ml)\b.*)?$",
    )
    .expect("valid title regex")
});

static LEAFLET_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)V\s*letáku.*").expect("valid leaflet suffix regex"));

static ADD_TO_LIST_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Přidat.*").expect("valid add-to-list suffix regex"));

static BUILTIN: LazyLock<Vec<RetailerPattern>> = LazyLock::new(|| {
    default_retailers()
        .into_iter()
        .map(|retailer| RetailerPattern {
            regex: Regex::new(&builtin_pattern(&retailer.name))
                .expect("valid built-in retailer regex"),
            name: retailer.name,
        })
        .collect()
});

/// Composite offer pattern for a listing block such as
/// `Lidl81 nejbližších poboček … 17,90 Kč / 1 kg –55 % platí do středy 17. 12.V letáku`.
///
/// The validity phrase ends at a line break, at `P`/`V`, or after
/// [`MAX_VALIDITY_CHARS`] characters, whichever comes first.
fn builtin_pattern(name: &str) -> String {
    format!(
        concat!(
            r"(?s){}\s*(?P<stores>\d+)\s*nejbližších\s*poboček",
            r".{{0,200}}?(?P<price>\d+(?:[.,]\d+)?\s*Kč\s*/\s*\d*\s*\p{{L}}+)",
            r"(?:.{{0,40}}?(?P<discount>[–-]\s*\d+\s*%))?",
            r".{{0,80}}?(?P<validity>\b(?:platí|dnes|zítra|pozítří|od|po|út|st|čt|pá|so|ne)\b[^PV\n]{{0,{max}}})",
        ),
        regex::escape(name),
        max = MAX_VALIDITY_CHARS,
    )
}

#[derive(Debug, Clone)]
struct RetailerPattern {
    name: String,
    regex: Regex,
}

/// Retailer names paired with their compiled offer patterns.
#[derive(Debug, Clone)]
pub struct RetailerRegistry {
    entries: Vec<RetailerPattern>,
}

impl Default for RetailerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RetailerRegistry {
    /// The default national chains with the built-in Czech pattern.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN.clone(),
        }
    }

    /// Compiles a registry from configuration rows.
    ///
    /// Rows without a pattern get the built-in pattern for their name. Custom
    /// patterns may use the named groups `stores`, `price`, `discount` and
    /// `validity`; `price` is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a custom pattern fails to compile or lacks
    /// a `price` group.
    pub fn from_configs(configs: &[RetailerConfig]) -> Result<Self, RegistryError> {
        let entries = configs
            .iter()
            .map(|config| {
                let pattern = config
                    .pattern
                    .clone()
                    .unwrap_or_else(|| builtin_pattern(&config.name));
                let regex =
                    Regex::new(&pattern).map_err(|source| RegistryError::InvalidPattern {
                        retailer: config.name.clone(),
                        source,
                    })?;
                if !regex.capture_names().flatten().any(|n| n == "price") {
                    return Err(RegistryError::MissingPriceGroup {
                        retailer: config.name.clone(),
                    });
                }
                Ok(RetailerPattern {
                    name: config.name.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recovers a product-name guess and offers from page text.
    ///
    /// Offers equal on retailer name and parsed price value are collapsed to
    /// the first occurrence.
    #[must_use]
    pub fn parse(&self, text: &str) -> FallbackParse {
        let product_name = TITLE_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty());

        let mut offers: Vec<RawOffer> = Vec::new();
        for entry in &self.entries {
            for caps in entry.regex.captures_iter(text) {
                let offer = raw_offer(&entry.name, &caps);
                let value = price_value(&offer);
                let duplicate = offers.iter().any(|seen| {
                    seen.retailer_name == offer.retailer_name && price_value(seen) == value
                });
                if duplicate {
                    debug!(retailer = %entry.name, "skipping duplicate text offer");
                    continue;
                }
                offers.push(offer);
            }
        }

        FallbackParse {
            product_name,
            offers,
        }
    }
}

/// Output of [`RetailerRegistry::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackParse {
    pub product_name: Option<String>,
    pub offers: Vec<RawOffer>,
}

fn raw_offer(retailer: &str, caps: &Captures<'_>) -> RawOffer {
    let group = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    RawOffer {
        retailer_name: Some(retailer.to_string()),
        price_text: group("price"),
        discount_text: group("discount"),
        validity_text: group("validity").map(|v| clean_validity(&v)),
        store_count_text: group("stores"),
        full_text: caps.get(0).map(|m| m.as_str().trim().to_string()),
        ..RawOffer::default()
    }
}

fn price_value(offer: &RawOffer) -> Option<rust_decimal::Decimal> {
    offer
        .price_text
        .as_deref()
        .and_then(parse_price)
        .and_then(|p| p.value)
}

fn clean_validity(raw: &str) -> String {
    let without_leaflet = LEAFLET_SUFFIX_RE.replace(raw, "");
    let cleaned = ADD_TO_LIST_SUFFIX_RE.replace(&without_leaflet, "");
    cleaned
        .trim()
        .chars()
        .take(MAX_VALIDITY_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}
