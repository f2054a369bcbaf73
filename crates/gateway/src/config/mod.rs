pub mod loader;
pub mod paths;
pub mod types;

pub use loader::{
    ConfigError, load_config, load_config_from_str, load_config_or_default, load_default_config,
};
pub use paths::resolve_download_dir;
pub use types::{ClientSettings, NodeConfig, NodesConfig};
