//! Turns fetched promotional pages into [`pricetl_core::ProcessedRecord`]s.
//!
//! Everything in this crate is synchronous and pure: the reference date and
//! crawl timestamp are always passed in, nothing reads the clock, and no
//! operation touches the network or the filesystem. Missing or malformed
//! input degrades to `None` fields instead of errors.

pub mod assemble;
pub mod dates;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod parse;

pub use assemble::{RecordAssembler, RunContext};
pub use dates::{find_validity_phrase, resolve, resolve_validity};
pub use error::RegistryError;
pub use fallback::{FallbackParse, RetailerRegistry};
pub use normalize::normalize_offer;
pub use parse::{parse_discount, parse_price, parse_store_count};
