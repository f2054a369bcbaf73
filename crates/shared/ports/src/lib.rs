//! bwilcd Ports
//!
//! Port definitions (traits) for the bwilcd client.
//! These define the boundary between the interactive shell and the
//! transport that talks to ILCD nodes.

mod error;
mod source;

pub use error::{FetchError, FetchResult};
pub use source::{Connector, Credentials, DataSource, DownloadProgress, SearchQuery};
