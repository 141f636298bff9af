//! Regex-based HTML handling: page text and selector-style extraction.
//!
//! No DOM is built. Markup is matched with tolerant patterns, which is enough
//! for listing pages whose structure is shallow and stable.

use std::sync::LazyLock;

use regex::Regex;

use pricetl_core::{CategoryLink, ExtractedPage, ProductFields, RawOffer};

static HIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<!--.*?-->")
        .expect("valid hidden content regex")
});

static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<br\s*/?>|</?(?:p|div|li|ul|ol|h[1-6]|article|section|header|footer|nav|main|aside|table|tr|td|th)\b[^>]*>",
    )
    .expect("valid block tag regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#(\d+)|#[xX]([0-9a-fA-F]+)|([a-zA-Z]+));").expect("valid entity regex")
});

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid h1 regex"));

static BREADCRUMB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)class\s*=\s*["'][^"']*breadcrumb[^"']*["'][^>]*>(.*?)</(?:nav|ol|ul)>"#)
        .expect("valid breadcrumb regex")
});

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
        .expect("valid anchor regex")
});

static OFFER_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<article\b[^>]*>|<(?:div|li)\b[^>]*class\s*=\s*["'][^"']*offer[^"']*["'][^>]*>"#)
        .expect("valid offer block regex")
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[23][^>]*>(.*?)</h[23]>").expect("valid heading regex"));

static VALIDITY_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<[a-z]+\b[^>]*class\s*=\s*["'][^"']*valid[^"']*["'][^>]*>(.*?)</"#)
        .expect("valid validity element regex")
});

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)?\s*Kč(?:\s*/\s*\d*\s*\p{L}+)?").expect("valid price regex")
});

static STORE_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+[^\d\n]{0,30}?poboč\p{L}*").expect("valid store count regex")
});

static DISCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[–-]?\s*\d+\s*%").expect("valid discount regex"));

/// Converts an HTML document to plain text, one block element per line.
///
/// Script, style and comment content is dropped, entities are decoded and
/// runs of whitespace inside a line collapse to one space.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_RE.replace_all(html, " ");
    let blocks = BLOCK_TAG_RE.replace_all(&visible, "\n");
    let bare = TAG_RE.replace_all(&blocks, " ");
    let decoded = decode_entities(&bare);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of an HTML fragment on a single line.
fn clean_text(fragment: &str) -> String {
    html_to_text(fragment)
        .lines()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let decimal = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let hex = caps
                .get(2)
                .and_then(|m| u32::from_str_radix(m.as_str(), 16).ok());
            if let Some(ch) = decimal.or(hex).and_then(char::from_u32) {
                return ch.to_string();
            }
            match caps.get(3).map(|m| m.as_str()) {
                Some("nbsp") => " ".to_string(),
                Some("amp") => "&".to_string(),
                Some("lt") => "<".to_string(),
                Some("gt") => ">".to_string(),
                Some("quot") => "\"".to_string(),
                Some("apos") => "'".to_string(),
                Some("ndash") => "–".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Selector-style extraction of a product listing page.
///
/// Reads the `h1` product name, breadcrumb links, the "běžně stojí" regular
/// price line, and one [`RawOffer`] per offer block (`<article>` or an element
/// whose class mentions `offer`). Blocks without a price are skipped.
#[must_use]
pub fn extract_page(html: &str) -> ExtractedPage {
    let product_name = H1_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|name| !name.is_empty());

    let category = BREADCRUMB_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| anchors(m.as_str()))
        .unwrap_or_default()
        .into_iter()
        .map(|(url, name)| CategoryLink {
            name,
            url: Some(url),
        })
        .collect();

    let regular_price_text = html_to_text(html)
        .lines()
        .find(|line| line.contains("běžně stojí"))
        .map(str::to_string);

    let offers = offer_blocks(html)
        .into_iter()
        .filter_map(extract_offer)
        .collect();

    ExtractedPage {
        product: ProductFields {
            product_name,
            category,
            product_category: None,
            regular_price_text,
        },
        offers,
    }
}

/// `(href, text)` of every anchor in `fragment`.
fn anchors(fragment: &str) -> Vec<(String, String)> {
    ANCHOR_RE
        .captures_iter(fragment)
        .filter_map(|caps| {
            let href = caps.get(1)?.as_str().trim().to_string();
            let text = clean_text(caps.get(2)?.as_str());
            Some((href, text))
        })
        .collect()
}

/// Slices `html` into offer blocks, each running to the next block start.
fn offer_blocks(html: &str) -> Vec<&str> {
    let starts: Vec<(usize, bool)> = OFFER_START_RE
        .find_iter(html)
        .map(|m| (m.start(), m.as_str()[1..].to_ascii_lowercase().starts_with("article")))
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &(start, is_article))| {
            let end = starts.get(i + 1).map_or(html.len(), |&(next, _)| next);
            let block = &html[start..end];
            if is_article {
                block
                    .to_ascii_lowercase()
                    .find("</article>")
                    .map_or(block, |close| &block[..close])
            } else {
                block
            }
        })
        .collect()
}

fn extract_offer(block: &str) -> Option<RawOffer> {
    let text = html_to_text(block);
    let price_text = PRICE_RE.find(&text)?.as_str().to_string();

    let links = anchors(block);
    let link = |marker: &str| {
        links
            .iter()
            .find(|(href, _)| href.contains(marker))
            .map(|(href, _)| href.clone())
    };

    let retailer_name = HEADING_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|name| !name.is_empty())
        .or_else(|| {
            links
                .iter()
                .find(|(href, text)| href.contains("/letaky/") && !text.is_empty())
                .map(|(_, text)| text.clone())
        });

    let validity_text = VALIDITY_CLASS_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|v| !v.is_empty());

    Some(RawOffer {
        retailer_name,
        retailer_url: link("/letaky/"),
        price_text: Some(price_text),
        discount_text: DISCOUNT_RE.find(&text).map(|m| m.as_str().trim().to_string()),
        validity_text,
        validity_start_date: None,
        validity_end_date: None,
        flyer_url: link("/letak/"),
        store_locations_url: link("/obchod/"),
        store_count_text: STORE_COUNT_RE.find(&text).map(|m| m.as_str().to_string()),
        full_text: Some(text.lines().collect::<Vec<_>>().join(" ")),
    })
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
