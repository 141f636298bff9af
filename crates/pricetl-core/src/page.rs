//! Payload shapes handed over by a page fetch.
//!
//! Extractors are loose about what they emit: selector extraction wraps the
//! page object in a list, model-assisted extraction uses shorter key names and
//! sometimes numbers where text is expected. These types absorb that so the
//! parser only ever sees optional strings.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// How structured data is pulled out of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Markup selectors (headings, breadcrumb links, offer blocks).
    Selector,
    /// Page text is sent to an external extraction model.
    ModelAssisted,
    /// No structured extraction; only the page text is returned.
    TextOnly,
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionStrategy::Selector => write!(f, "selector"),
            ExtractionStrategy::ModelAssisted => write!(f, "model"),
            ExtractionStrategy::TextOnly => write!(f, "none"),
        }
    }
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selector" | "css" | "detailed" => Ok(ExtractionStrategy::Selector),
            "model" | "model-assisted" | "llm" => Ok(ExtractionStrategy::ModelAssisted),
            "none" | "text" | "simple" => Ok(ExtractionStrategy::TextOnly),
            other => Err(format!(
                "unknown extraction strategy '{other}'; expected selector, model, or none"
            )),
        }
    }
}

/// One breadcrumb entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLink {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Offer fields exactly as an extractor produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOffer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub retailer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub retailer_url: Option<String>,
    #[serde(default, alias = "price", deserialize_with = "lenient_string")]
    pub price_text: Option<String>,
    #[serde(default, alias = "discount", deserialize_with = "lenient_string")]
    pub discount_text: Option<String>,
    #[serde(default, alias = "validity", deserialize_with = "lenient_string")]
    pub validity_text: Option<String>,
    /// ISO date pre-computed by a model-assisted extractor, if any.
    #[serde(default, deserialize_with = "lenient_string")]
    pub validity_start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub validity_end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub flyer_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub store_locations_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub store_count_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_text: Option<String>,
}

/// Product-level fields of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    #[serde(default, alias = "page_title", deserialize_with = "lenient_string")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Vec<CategoryLink>,
    /// Single category label, as model-assisted extraction reports it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub regular_price_text: Option<String>,
}

impl ProductFields {
    /// Breadcrumb entries with a non-empty name.
    ///
    /// Falls back to a one-element trail built from `product_category` when
    /// no breadcrumb links were extracted.
    #[must_use]
    pub fn breadcrumb(&self) -> Vec<CategoryLink> {
        let links: Vec<CategoryLink> = self
            .category
            .iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| CategoryLink {
                name: c.name.trim().to_string(),
                url: c.url.clone().filter(|u| !u.trim().is_empty()),
            })
            .collect();
        if !links.is_empty() {
            return links;
        }
        self.product_category
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                vec![CategoryLink {
                    name: name.to_string(),
                    url: None,
                }]
            })
            .unwrap_or_default()
    }
}

/// Structured extraction output for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    #[serde(flatten)]
    pub product: ProductFields,
    #[serde(default)]
    pub offers: Vec<RawOffer>,
}

impl ExtractedPage {
    /// Reads an extractor's JSON output.
    ///
    /// Accepts the page object itself or a list whose first element is the
    /// page object. `null` and an empty list yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the value has the wrong shape.
    pub fn from_json(value: serde_json::Value) -> Result<Option<Self>, serde_json::Error> {
        let value = match value {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Array(items) => match items.into_iter().next() {
                Some(first) => first,
                None => return Ok(None),
            },
            other => other,
        };
        serde_json::from_value(value).map(Some)
    }
}

/// Result of fetching one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    pub success: bool,
    pub structured: Option<ExtractedPage>,
    pub raw_text: Option<String>,
    pub error: Option<String>,
}

impl FetchResult {
    #[must_use]
    pub fn success(
        url: impl Into<String>,
        structured: Option<ExtractedPage>,
        raw_text: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            success: true,
            structured,
            raw_text,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            structured: None,
            raw_text: None,
            error: Some(error.into()),
        }
    }
}

/// Accepts strings, numbers and booleans as text; anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
