//! Page fetching for the price timeline crawler.
//!
//! [`PageClient`] downloads a product page, converts it to text, and runs the
//! requested [`pricetl_core::ExtractionStrategy`]. Failures never escape as
//! errors: they are folded into an unsuccessful [`pricetl_core::FetchResult`]
//! so a batch can continue past a bad URL.

pub mod client;
pub mod error;
pub mod html;
pub mod model;
pub(crate) mod rate_limit;

pub use client::{PageClient, PageFetcher};
pub use error::ScraperError;
pub use html::{extract_page, html_to_text};
pub use model::ModelEndpoint;
