mod crawl;
mod offline;
mod records;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pricetl_core::{AppConfig, ExtractionStrategy};
use pricetl_parser::{RecordAssembler, RetailerRegistry};

#[derive(Debug, Parser)]
#[command(name = "pricetl")]
#[command(about = "Promotional price timeline crawler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every listed URL and store raw snapshots and processed records
    Crawl {
        /// Newline-delimited URL list (defaults to PRICETL_URLS_PATH)
        #[arg(long)]
        urls: Option<PathBuf>,
        /// Extraction strategy: selector, model, or none
        #[arg(long)]
        strategy: Option<ExtractionStrategy>,
        /// Maximum in-flight fetches; 1 crawls sequentially with a delay
        #[arg(long)]
        concurrency: Option<usize>,
        /// List what would be crawled without fetching anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Process a saved page offline and print the record as JSON
    Parse {
        /// Saved page: plain text, or HTML when the extension is .html/.htm
        #[arg(long)]
        file: PathBuf,
        /// Source URL recorded in the output metadata
        #[arg(long)]
        url: String,
        /// Date treated as "today" (defaults to the local date)
        #[arg(long)]
        reference_date: Option<NaiveDate>,
        /// Structured extraction output to use instead of selector extraction
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Print the latest processed record for a slug
    Show { slug: String },
    /// List stored processed records
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = pricetl_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Crawl {
            urls,
            strategy,
            concurrency,
            dry_run,
        } => {
            let options = crawl::CrawlArgs {
                urls_path: urls.unwrap_or_else(|| config.urls_path.clone()),
                strategy: strategy.unwrap_or(config.extraction_strategy),
                concurrency: concurrency.unwrap_or(config.crawler_max_concurrent),
                dry_run,
            };
            crawl::run_crawl_command(&config, &options).await
        }
        Commands::Parse {
            file,
            url,
            reference_date,
            json,
        } => {
            let assembler = build_assembler(&config)?;
            offline::run_parse_command(&assembler, &file, &url, reference_date, json.as_deref())
        }
        Commands::Show { slug } => records::run_show(&config, &slug),
        Commands::List => records::run_list(&config),
    }
}

/// Builds the record assembler from the configured retailer registry.
pub(crate) fn build_assembler(config: &AppConfig) -> anyhow::Result<RecordAssembler> {
    let registry = match &config.retailers_path {
        Some(path) => {
            let file = pricetl_core::load_retailers(path)?;
            RetailerRegistry::from_configs(&file.retailers)?
        }
        None => RetailerRegistry::builtin(),
    };
    tracing::debug!(retailers = registry.len(), "retailer registry ready");
    Ok(RecordAssembler::new(registry))
}
