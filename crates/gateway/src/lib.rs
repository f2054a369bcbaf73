//! Gateway Crate
//!
//! HTTP side of bwilcd: connects to ILCD-Network / SODA4LCA nodes, fetches
//! Service-API XML and hands it to the parser. Also owns the node
//! configuration (`nodes.json`).
//!
//! ```text
//! ┌──────────────┐  XML over HTTP  ┌──────────────┐  DataSource  ┌───────┐
//! │  ILCD node   │ ──────────────▶ │  RestClient  │ ───────────▶ │ shell │
//! │ /resource/.. │                 │  + cache     │              │       │
//! └──────────────┘                 └──────┬───────┘              └───────┘
//!                                         │ parse / enrich
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │ bwilcd-parser│
//!                                  └──────────────┘
//! ```

pub mod config;
pub mod infrastructure;

pub use config::{
    ClientSettings, ConfigError, NodeConfig, NodesConfig, load_config, load_config_from_str,
    load_config_or_default, load_default_config, resolve_download_dir,
};
pub use infrastructure::{HttpConnector, ResponseCache, RestClient, RestError, normalize_base_url};
