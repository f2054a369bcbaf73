//! Parsing of ILCD Service-API XML payloads into the bwilcd data model.
//!
//! Every function here is pure: it takes a fully buffered response body
//! and returns owned values. Missing elements become absent fields or
//! empty collections; only XML that is not well-formed is an error.

mod dataset;
mod document;
mod enrich;
mod error;
mod fallback;
mod flows;
pub mod namespaces;
mod search;
mod stocks;

pub use dataset::{extract_exchanges, parse_dataset};
pub use document::{Document, Element, Name};
pub use enrich::{enrich, enrich_dataset};
pub use error::{ParseError, ParseResult};
pub use fallback::{FieldPaths, first_non_empty};
pub use flows::parse_flow_info;
pub use search::parse_datasets_search;
pub use stocks::parse_stocks;
