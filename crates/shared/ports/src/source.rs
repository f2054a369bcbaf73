use async_trait::async_trait;
use bwilcd_core::{DatasetDetail, SearchPage, Stock, StockId};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{FetchError, FetchResult};

/// Progress callback for downloads: `(bytes_received, content_length)`.
///
/// `content_length` is 0 when the server does not announce a size.
pub type DownloadProgress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// HTTP basic-auth credentials. Both halves are always present.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Combine optional username and password.
    ///
    /// Both empty/absent means no authentication; exactly one present is
    /// rejected.
    pub fn from_parts(
        username: Option<String>,
        password: Option<String>,
    ) -> FetchResult<Option<Self>> {
        let username = username.filter(|s| !s.is_empty());
        let password = password.filter(|s| !s.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Ok(Some(Self { username, password })),
            (None, None) => Ok(None),
            _ => Err(FetchError::InvalidCredentials),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One page request against a stock's process listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub stock: StockId,
    /// Name substring filter; empty lists everything
    pub name: String,
    /// Zero-based page number
    pub page: u64,
    pub page_size: u64,
}

impl SearchQuery {
    pub fn new(stock: impl Into<StockId>, page_size: u64) -> Self {
        Self {
            stock: stock.into(),
            name: String::new(),
            page: 0,
            page_size,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Index of the first result on this page (`page * page_size`)
    pub fn start_index(&self) -> u64 {
        self.page * self.page_size
    }

    pub fn is_filtered(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Port for reading from one ILCD node
///
/// Implemented by the HTTP gateway; the shell only ever talks to this trait.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Base URL of the node's service API
    fn base_url(&self) -> &str;

    /// List the data stocks offered by the node
    async fn stocks(&self) -> FetchResult<Vec<Stock>>;

    /// Fetch one page of process datasets in a stock
    async fn search(&self, query: &SearchQuery) -> FetchResult<SearchPage>;

    /// Fetch a dataset with its exchanges enriched by flow metadata
    async fn dataset(&self, identifier: &str) -> FetchResult<DatasetDetail>;

    /// Download a whole stock as a ZIP archive into `dest_dir`
    async fn download_stock(
        &self,
        stock: &str,
        dest_dir: &Path,
        progress: DownloadProgress<'_>,
    ) -> FetchResult<PathBuf>;

    /// Drop any memoized responses so the next reads hit the server
    fn invalidate(&self) {}
}

/// Port for opening a [`DataSource`] on a node
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and probe the node; fails when the node is unreachable
    async fn connect(
        &self,
        url: &str,
        credentials: Option<Credentials>,
    ) -> FetchResult<Arc<dyn DataSource>>;
}
