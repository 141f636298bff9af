use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, TimeZone};
use pricetl_core::FetchResult;

use super::*;

const LIDL_TEXT: &str =
    "Aktuální akční slevy Banány 1 kg\nLidl81 nejbližších poboček 17,90 Kč / 1 kg –55 % platí do středy 17. 12.V letáku";

/// Serves canned fetch results; unknown URLs fail like a 404.
struct FakeFetcher {
    pages: HashMap<String, FetchResult>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    fn new(pages: Vec<FetchResult>) -> Self {
        Self {
            pages: pages.into_iter().map(|p| (p.url.clone(), p)).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _strategy: ExtractionStrategy) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchResult::failure(url, format!("page not found: {url}")))
    }
}

fn plan(concurrency: usize) -> CrawlPlan {
    CrawlPlan {
        strategy: ExtractionStrategy::TextOnly,
        concurrency,
        delay: Duration::ZERO,
        run: RunContext {
            reference_date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            crawled_at: Utc.with_ymd_and_hms(2025, 12, 15, 8, 0, 0).unwrap(),
        },
    }
}

fn urls(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn sequential_crawl_stores_records_and_isolates_failures() {
    let root = tempfile::tempdir().unwrap();
    let store = Store::open(root.path().join("raw"), root.path().join("processed")).unwrap();
    let fetcher = FakeFetcher::new(vec![FetchResult::success(
        "https://www.kupi.cz/sleva/banany",
        None,
        Some(LIDL_TEXT.to_string()),
    )]);

    let list = urls(&[
        "https://www.kupi.cz/sleva/chyba",
        "https://www.kupi.cz/sleva/banany",
    ]);
    let summary = crawl_urls(
        &fetcher,
        &RecordAssembler::default(),
        &store,
        &list,
        &plan(1),
    )
    .await;

    assert_eq!(
        summary,
        CrawlSummary {
            succeeded: 1,
            failed: 1,
            offers: 1
        }
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    assert!(summary.ensure_any_succeeded().is_ok());

    let stored = store.load_processed("banany").unwrap().unwrap();
    assert_eq!(stored.data.product.name.as_deref(), Some("Banány"));
    assert_eq!(stored.metadata.timestamp, plan(1).run.crawled_at);
    assert!(store.load_processed("chyba").unwrap().is_none());

    // Both fetches leave a raw snapshot, including the failed one.
    assert_eq!(store.list_raw(None).unwrap().len(), 2);
    assert_eq!(store.list_raw(Some("chyba")).unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_crawl_processes_every_url() {
    let root = tempfile::tempdir().unwrap();
    let store = Store::open(root.path().join("raw"), root.path().join("processed")).unwrap();
    let pages: Vec<FetchResult> = ["banany", "jablka", "hrusky"]
        .iter()
        .map(|slug| {
            FetchResult::success(
                format!("https://www.kupi.cz/sleva/{slug}"),
                None,
                Some(LIDL_TEXT.to_string()),
            )
        })
        .collect();
    let list: Vec<String> = pages.iter().map(|p| p.url.clone()).collect();
    let fetcher = FakeFetcher::new(pages);

    let summary = crawl_urls(
        &fetcher,
        &RecordAssembler::default(),
        &store,
        &list,
        &plan(2),
    )
    .await;

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.list_processed().unwrap().len(), 3);
}

#[tokio::test]
async fn successful_fetch_without_offers_still_stores_record() {
    let root = tempfile::tempdir().unwrap();
    let store = Store::open(root.path().join("raw"), root.path().join("processed")).unwrap();
    let fetcher = FakeFetcher::new(vec![FetchResult::success(
        "https://www.kupi.cz/sleva/maslo",
        None,
        Some("Žádné nabídky".to_string()),
    )]);

    let summary = crawl_urls(
        &fetcher,
        &RecordAssembler::default(),
        &store,
        &urls(&["https://www.kupi.cz/sleva/maslo"]),
        &plan(1),
    )
    .await;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.offers, 0);
    let stored = store.load_processed("maslo").unwrap().unwrap();
    assert!(stored.data.offers.is_empty());
}

#[test]
fn all_failed_is_an_error() {
    let summary = CrawlSummary {
        succeeded: 0,
        failed: 2,
        offers: 0,
    };
    let err = summary.ensure_any_succeeded().unwrap_err();
    assert!(err.to_string().contains("all 2 URLs failed"));
}

#[test]
fn empty_summary_is_not_an_error() {
    assert!(CrawlSummary::default().ensure_any_succeeded().is_ok());
}
