use std::path::Path;
use thiserror::Error;
use tracing::warn;

use super::types::{NodeConfig, NodesConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No nodes in config")]
    NoNodes,
    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

/// Load node configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NodesConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<NodesConfig, ConfigError> {
    let config: NodesConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the embedded default configuration
pub fn load_default_config() -> Result<NodesConfig, ConfigError> {
    let default_config = include_str!("nodes.json");
    load_config_from_str(default_config)
}

/// Load `path` when given, falling back to the embedded default when the
/// file is unreadable, malformed or lists no nodes.
///
/// The error that caused the fallback is returned alongside so the caller
/// can tell the user.
pub fn load_config_or_default(
    path: Option<&Path>,
) -> Result<(NodesConfig, Option<ConfigError>), ConfigError> {
    let Some(path) = path else {
        return Ok((load_default_config()?, None));
    };

    match load_config(path).and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => Ok((config, None)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using default node configuration");
            Ok((load_default_config()?, Some(e)))
        }
    }
}

impl NodesConfig {
    /// Node by its 1-based position in the list
    pub fn node(&self, index: usize) -> Result<&NodeConfig, ConfigError> {
        index
            .checked_sub(1)
            .and_then(|i| self.nodes.get(i))
            .ok_or_else(|| ConfigError::NodeNotFound(index.to_string()))
    }

    /// Node by name, ignoring case
    pub fn find(&self, name: &str) -> Result<&NodeConfig, ConfigError> {
        self.nodes
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::NodeNotFound(name.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }
        Ok(())
    }
}
