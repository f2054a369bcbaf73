use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root of `nodes.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesConfig {
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub client: ClientSettings,
}

/// One predefined ILCD node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Display name
    pub name: String,
    /// Server root; `/resource` is appended when missing
    pub url: String,
    /// Basic-auth username, used without prompting when set
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        NodeConfig {
            name: name.into(),
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Whether the node carries any credentials of its own
    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            || self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// HTTP client behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Datasets per search page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Maximum number of memoized responses (0 disables caching)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Skip TLS certificate verification
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Where stock exports are written
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            page_size: default_page_size(),
            cache_capacity: default_cache_capacity(),
            accept_invalid_certs: default_true(),
            timeout_ms: default_timeout(),
            download_dir: None,
        }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_page_size() -> u64 {
    20
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30_000
}
