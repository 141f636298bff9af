use thiserror::Error;

/// Errors raised while compiling a configured retailer registry.
///
/// Parsing itself never fails; only bad configuration does.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid offer pattern for retailer {retailer}: {source}")]
    InvalidPattern {
        retailer: String,
        #[source]
        source: regex::Error,
    },

    #[error("offer pattern for retailer {retailer} has no `price` capture group")]
    MissingPriceGroup { retailer: String },
}
