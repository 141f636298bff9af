//! Batch crawl: fetch, snapshot, assemble, store.
//!
//! A failing URL is logged and counted, never propagated, so one bad page
//! does not abort the batch. The command only fails when every URL failed.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, Utc};
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};

use pricetl_core::{AppConfig, ExtractionStrategy};
use pricetl_parser::{RecordAssembler, RunContext};
use pricetl_scraper::{ModelEndpoint, PageClient, PageFetcher};
use pricetl_store::Store;

/// Resolved `crawl` command options (CLI flags over config defaults).
#[derive(Debug, Clone)]
pub(crate) struct CrawlArgs {
    pub urls_path: PathBuf,
    pub strategy: ExtractionStrategy,
    pub concurrency: usize,
    pub dry_run: bool,
}

/// Per-run settings shared by every item.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CrawlPlan {
    pub strategy: ExtractionStrategy,
    pub concurrency: usize,
    pub delay: Duration,
    pub run: RunContext,
}

/// Outcome of one URL.
#[derive(Debug)]
pub(crate) enum ItemOutcome {
    Stored { offers: usize },
    Failed(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CrawlSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub offers: usize,
}

impl CrawlSummary {
    fn record(&mut self, url: &str, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Stored { offers } => {
                self.succeeded += 1;
                self.offers += offers;
            }
            ItemOutcome::Failed(error) => {
                tracing::error!(url, error = %error, "crawl item failed");
                self.failed += 1;
            }
        }
    }

    /// Errors when there was work and none of it succeeded.
    pub fn ensure_any_succeeded(&self) -> anyhow::Result<()> {
        if self.succeeded == 0 && self.failed > 0 {
            anyhow::bail!("all {} URLs failed", self.failed);
        }
        Ok(())
    }
}

/// Entry point of `pricetl crawl`.
pub(crate) async fn run_crawl_command(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    let urls = pricetl_core::load_url_list(&args.urls_path)?;
    if urls.is_empty() {
        tracing::warn!(path = %args.urls_path.display(), "URL list is empty, nothing to crawl");
        return Ok(());
    }

    if args.dry_run {
        println!(
            "dry-run: would crawl {} URLs with strategy {}:",
            urls.len(),
            args.strategy
        );
        for url in &urls {
            println!("  {url}");
        }
        return Ok(());
    }

    let plan = CrawlPlan {
        strategy: args.strategy,
        concurrency: args.concurrency.max(1),
        delay: Duration::from_secs(config.crawler_delay_secs),
        run: RunContext {
            reference_date: Local::now().date_naive(),
            crawled_at: Utc::now(),
        },
    };

    let mut client = PageClient::new(
        config.crawler_timeout_ms,
        &config.crawler_user_agent,
        config.crawler_max_retries,
        config.crawler_retry_backoff_base_ms,
    )
    .map_err(|e| anyhow::anyhow!("failed to build page client: {e}"))?;
    if let Some(endpoint) = &config.extraction_endpoint {
        client = client.with_model_endpoint(ModelEndpoint {
            url: endpoint.clone(),
            api_key: config.extraction_api_key.clone(),
            reference_date: plan.run.reference_date,
        });
    }

    let assembler = crate::build_assembler(config)?;
    let store = Store::open(&config.raw_dir, &config.processed_dir)?;

    tracing::info!(
        urls = urls.len(),
        strategy = %plan.strategy,
        concurrency = plan.concurrency,
        reference_date = %plan.run.reference_date,
        "starting crawl"
    );

    let summary = crawl_urls(&client, &assembler, &store, &urls, &plan).await;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        offers = summary.offers,
        "crawl finished"
    );
    println!(
        "crawled {} URLs: {} succeeded, {} failed, {} offers",
        urls.len(),
        summary.succeeded,
        summary.failed,
        summary.offers
    );

    summary.ensure_any_succeeded()
}

/// Crawls `urls` sequentially with `plan.delay` between requests when
/// `plan.concurrency` is 1, otherwise with at most `plan.concurrency`
/// fetches in flight.
pub(crate) async fn crawl_urls<F: PageFetcher>(
    fetcher: &F,
    assembler: &RecordAssembler,
    store: &Store,
    urls: &[String],
    plan: &CrawlPlan,
) -> CrawlSummary {
    let mut summary = CrawlSummary::default();

    if plan.concurrency <= 1 {
        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !plan.delay.is_zero() {
                tokio::time::sleep(plan.delay).await;
            }
            let outcome = crawl_one(fetcher, assembler, store, url, plan).await;
            summary.record(url, &outcome);
        }
        return summary;
    }

    let outcomes: Vec<(&String, ItemOutcome)> = stream::iter(urls)
        .map(|url| async move { (url, crawl_one(fetcher, assembler, store, url, plan).await) })
        .buffer_unordered(plan.concurrency)
        .collect()
        .await;

    for (url, outcome) in &outcomes {
        summary.record(url, outcome);
    }
    summary
}

async fn crawl_one<F: PageFetcher>(
    fetcher: &F,
    assembler: &RecordAssembler,
    store: &Store,
    url: &str,
    plan: &CrawlPlan,
) -> ItemOutcome {
    let fetch = fetcher.fetch(url, plan.strategy).await;

    let mut extra = Map::new();
    extra.insert("success".to_string(), Value::Bool(fetch.success));
    extra.insert(
        "strategy".to_string(),
        Value::String(plan.strategy.to_string()),
    );
    if let Err(e) = store.save_raw(url, &fetch, extra, plan.run.crawled_at) {
        tracing::warn!(url, error = %e, "failed to save raw snapshot");
    }

    let Some(record) = assembler.assemble_fetch(&fetch, &plan.run) else {
        return ItemOutcome::Failed(
            fetch
                .error
                .unwrap_or_else(|| "fetch failed without an error message".to_string()),
        );
    };

    if let Err(e) = store.save_processed(url, &record, plan.run.crawled_at) {
        return ItemOutcome::Failed(format!("failed to save processed record: {e}"));
    }

    tracing::info!(
        url,
        offers = record.offers.len(),
        best_price = ?record.best_price(),
        "page processed"
    );
    ItemOutcome::Stored {
        offers: record.offers.len(),
    }
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
