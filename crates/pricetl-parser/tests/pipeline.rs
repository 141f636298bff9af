//! End-to-end tests for `RecordAssembler` over page-shaped fixtures.
//!
//! The text fixture mirrors the flattened text of a product listing page:
//! a title line, then one block per retailer with store count, price,
//! discount and validity, each block closed by leaflet boilerplate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use pricetl_core::{ExtractedPage, FetchResult, RetailerConfig};
use pricetl_parser::{RecordAssembler, RetailerRegistry, RunContext};

const URL: &str = "https://www.kupi.cz/sleva/banany";

const PAGE_TEXT: &str = "\
Aktuální akční slevy Banány 1 kg
Lidl81 nejbližších poboček
Banány volné
17,90 Kč / 1 kg
–55 %
platí do středy 17. 12.V letáku Lidl
Přidat do seznamu
Penny Market45 nejbližších poboček
Banány
19,90 Kč / 1 kg
–40 %
čt 18. 12. – pá 19. 12.V letáku Penny Market
Lidl81 nejbližších poboček
Banány volné
17,90 Kč / 1 kg
–55 %
platí do středy 17. 12.V letáku Lidl
";

fn run() -> RunContext {
    RunContext {
        reference_date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
        crawled_at: DateTime::parse_from_rfc3339("2025-12-15T08:30:00+01:00")
            .unwrap()
            .with_timezone(&Utc),
    }
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

// ---------------------------------------------------------------------------
// Text fallback path
// ---------------------------------------------------------------------------

#[test]
fn text_page_yields_deduplicated_offers() {
    let fetch = FetchResult::success(URL, None, Some(PAGE_TEXT.to_string()));
    let record = RecordAssembler::default()
        .assemble_fetch(&fetch, &run())
        .expect("successful fetch yields a record");

    assert_eq!(record.product.name.as_deref(), Some("Banány"));
    assert_eq!(record.offers.len(), 2, "duplicate Lidl block collapses");

    let lidl = &record.offers[0];
    assert_eq!(lidl.retailer.name.as_deref(), Some("Lidl"));
    assert_eq!(lidl.store_locations.count, Some(81));
    let pricing = lidl.pricing.as_ref().unwrap();
    assert_eq!(pricing.value, Some(Decimal::new(1790, 2)));
    assert_eq!(pricing.currency.as_deref(), Some("CZK"));
    assert_eq!(pricing.unit.as_deref(), Some("1 kg"));
    assert_eq!(lidl.discount.as_ref().unwrap().percentage, Some(55));
    assert_eq!(lidl.validity.start_date, None);
    assert_eq!(lidl.validity.end_date, date(2025, 12, 17));

    let penny = &record.offers[1];
    assert_eq!(penny.retailer.name.as_deref(), Some("Penny Market"));
    assert_eq!(penny.store_locations.count, Some(45));
    assert_eq!(penny.discount.as_ref().unwrap().percentage, Some(40));
    assert_eq!(penny.validity.start_date, date(2025, 12, 18));
    assert_eq!(penny.validity.end_date, date(2025, 12, 19));

    assert_eq!(record.best_price(), Some(Decimal::new(1790, 2)));
}

#[test]
fn configured_registry_limits_retailers() {
    let registry = RetailerRegistry::from_configs(&[RetailerConfig::named("Penny Market")])
        .expect("built-in pattern compiles");
    let fetch = FetchResult::success(URL, None, Some(PAGE_TEXT.to_string()));
    let record = RecordAssembler::new(registry)
        .assemble_fetch(&fetch, &run())
        .unwrap();

    assert_eq!(record.offers.len(), 1);
    assert_eq!(
        record.offers[0].retailer.name.as_deref(),
        Some("Penny Market")
    );
}

#[test]
fn failed_fetch_yields_no_record() {
    let fetch = FetchResult::failure(URL, "HTTP 503");
    assert!(RecordAssembler::default()
        .assemble_fetch(&fetch, &run())
        .is_none());
}

// ---------------------------------------------------------------------------
// Structured path
// ---------------------------------------------------------------------------

#[test]
fn selector_payload_list_is_assembled() {
    let payload = json!([{
        "product_name": "Banány",
        "category": [
            {"name": "Potraviny", "url": "https://www.kupi.cz/slevy/potraviny"},
            {"name": "Ovoce", "url": "https://www.kupi.cz/slevy/ovoce"}
        ],
        "regular_price_text": "běžně stojí 39,90 Kč / 1 kg",
        "offers": [
            {
                "retailer_name": "Kaufland",
                "price_text": "21,90 Kč / 1 kg",
                "discount_text": "–45 %",
                "validity_text": "od 16. 12. do 22. 12.",
                "store_count_text": "12 nejbližších poboček",
                "flyer_url": "https://www.kupi.cz/letak/kaufland-1"
            },
            {
                "retailer_name": "",
                "price_text": "v letáku"
            }
        ]
    }]);
    let page = ExtractedPage::from_json(payload).unwrap();
    let fetch = FetchResult::success(URL, page, Some(PAGE_TEXT.to_string()));

    let record = RecordAssembler::default()
        .assemble_fetch(&fetch, &run())
        .unwrap();

    let categories: Vec<_> = record
        .product
        .category
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(categories, ["Potraviny", "Ovoce"]);
    assert_eq!(
        record.product.regular_price.as_ref().and_then(|p| p.value),
        Some(Decimal::new(3990, 2))
    );

    // Structured offers win; the empty-retailer, unparsable-price offer is dropped.
    assert_eq!(record.offers.len(), 1);
    let kaufland = &record.offers[0];
    assert_eq!(kaufland.retailer.name.as_deref(), Some("Kaufland"));
    assert_eq!(kaufland.validity.start_date, date(2025, 12, 16));
    assert_eq!(kaufland.validity.end_date, date(2025, 12, 22));
    assert_eq!(kaufland.store_locations.count, Some(12));
}

#[test]
fn model_payload_uses_short_keys_and_iso_dates() {
    let payload = json!({
        "product_name": "Banány",
        "product_category": "Ovoce",
        "offers": [{
            "retailer_name": "Albert",
            "price": "18,90 Kč / 1 kg",
            "discount": "-30 %",
            "validity": "",
            "validity_start_date": "2025-12-15",
            "validity_end_date": "2025-12-21"
        }]
    });
    let page = ExtractedPage::from_json(payload).unwrap();
    let fetch = FetchResult::success(URL, page, None);

    let record = RecordAssembler::default()
        .assemble_fetch(&fetch, &run())
        .unwrap();

    assert_eq!(record.product.category[0].name, "Ovoce");
    let albert = &record.offers[0];
    assert_eq!(albert.discount.as_ref().unwrap().percentage, Some(30));
    assert_eq!(albert.validity.start_date, date(2025, 12, 15));
    assert_eq!(albert.validity.end_date, date(2025, 12, 21));
}

#[test]
fn record_serializes_with_iso_dates_and_numeric_prices() {
    let fetch = FetchResult::success(URL, None, Some(PAGE_TEXT.to_string()));
    let record = RecordAssembler::default()
        .assemble_fetch(&fetch, &run())
        .unwrap();

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["offers"][0]["validity"]["end_date"], "2025-12-17");
    assert_eq!(value["offers"][0]["pricing"]["value"], json!(17.9));
    assert_eq!(value["metadata"]["source_url"], URL);
}
