//! Infrastructure Layer - adapters for ILCD nodes
//!
//! - RestClient: HTTP client for the Service API, implements `DataSource`
//! - HttpConnector: builds and probes clients, implements `Connector`
//! - ResponseCache: bounded memo of XML response bodies

pub mod cache;
pub mod connector;
pub mod rest_client;

pub use cache::ResponseCache;
pub use connector::HttpConnector;
pub use rest_client::{RestClient, RestError, normalize_base_url};
