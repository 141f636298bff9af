//! `pricetl show` and `pricetl list`: read back stored records.

use pricetl_core::AppConfig;
use pricetl_store::{slug_of_processed, Store};

pub(crate) fn run_show(config: &AppConfig, slug: &str) -> anyhow::Result<()> {
    let store = Store::open(&config.raw_dir, &config.processed_dir)?;
    let Some(stored) = store.load_processed(slug)? else {
        anyhow::bail!("no processed record for '{slug}'");
    };
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}

pub(crate) fn run_list(config: &AppConfig) -> anyhow::Result<()> {
    let store = Store::open(&config.raw_dir, &config.processed_dir)?;
    let paths = store.list_processed()?;
    if paths.is_empty() {
        println!("no processed records in {}", store.processed_dir().display());
        return Ok(());
    }

    for path in &paths {
        let Some(slug) = slug_of_processed(path) else {
            continue;
        };
        match store.load_processed(slug) {
            Ok(Some(stored)) => {
                let best = stored
                    .data
                    .best_price()
                    .map_or_else(|| "-".to_string(), |p| p.to_string());
                println!(
                    "{slug}\t{} offers\tbest {best}\t{}",
                    stored.data.offers.len(),
                    stored.metadata.timestamp.to_rfc3339()
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(slug, error = %e, "skipping unreadable record"),
        }
    }
    Ok(())
}
