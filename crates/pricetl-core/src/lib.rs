//! Shared domain types and configuration for the price timeline crawler.
//!
//! Everything that crosses a crate boundary lives here: the processed record
//! model, the payload a fetch hands to the parser, the retailer registry
//! configuration, and the environment-driven [`AppConfig`].

pub mod app_config;
pub mod config;
pub mod page;
pub mod records;
pub mod retailers;
pub mod urls;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use page::{CategoryLink, ExtractedPage, ExtractionStrategy, FetchResult, ProductFields, RawOffer};
pub use records::{
    DiscountInfo, Offer, PriceQuantity, ProcessedRecord, Product, RecordMetadata, RetailerInfo,
    StoreLocationsInfo, ValidityPeriod,
};
pub use retailers::{default_retailers, load_retailers, RetailerConfig, RetailersFile};
pub use urls::{load_url_list, parse_url_list};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[from] serde_yaml::Error),

    #[error("failed to read URL list {path}: {source}")]
    UrlListIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}
