//! Interactive session state machine
//!
//! The session owns no terminal. It turns a [`Command`] into an [`Outcome`]
//! that the front end renders, and it only talks to nodes through the
//! [`Connector`] and [`DataSource`] ports.

use bwilcd_core::{DatasetDetail, SearchPage, Stock};
use bwilcd_gateway::{NodeConfig, NodesConfig};
use bwilcd_ports::{Connector, Credentials, DataSource, DownloadProgress, FetchError, SearchQuery};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::command::Command;

/// Where the user currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Not connected; predefined nodes are listed
    Nodes,
    /// Connected; the node's data stocks are listed
    Stocks,
    /// A stock is selected; its process datasets are paged
    Datasets,
}

/// Node to connect to, resolved from a node number or a custom URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    pub url: String,
    /// Configured credentials; `None` means the user should be asked
    pub credentials: Option<Credentials>,
}

impl ConnectTarget {
    pub fn needs_login(&self) -> bool {
        self.credentials.is_none()
    }
}

/// What the front end should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    ShowNodes,
    ShowStocks,
    ShowDatasets,
    ShowDataset(Box<DatasetDetail>),
    Help(Level),
    /// Ask for login if needed, then call [`Session::connect`]
    Connect(ConnectTarget),
    /// Announce, then call [`Session::download`]
    Download(Stock),
    Refreshed,
    /// Soft warning; state is unchanged
    Notice(&'static str),
    Quit,
    Nothing,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid command")]
    InvalidCommand,

    #[error("Invalid node number")]
    InvalidNode,

    #[error("Invalid stock number")]
    InvalidStock,

    #[error("Invalid dataset number")]
    InvalidDataset,

    #[error("Please provide a valid {0} number")]
    NotANumber(&'static str),

    #[error("Please provide a URL")]
    MissingUrl,

    #[error("Failed to connect to server: {0}")]
    ConnectFailed(FetchError),

    #[error("No data stocks found on server")]
    NoStocks,

    #[error("{0}")]
    Fetch(#[from] FetchError),
}

impl SessionError {
    /// Errors after which offering to retry the connection makes sense
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, SessionError::ConnectFailed(_) | SessionError::NoStocks)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

pub struct Session {
    connector: Arc<dyn Connector>,
    config: NodesConfig,
    page_size: u64,
    download_dir: PathBuf,

    source: Option<Arc<dyn DataSource>>,
    stocks: Vec<Stock>,
    current_stock: Option<Stock>,
    page: u64,
    query: String,
    last_page: Option<SearchPage>,
}

impl Session {
    pub fn new(
        connector: Arc<dyn Connector>,
        config: NodesConfig,
        page_size: u64,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            connector,
            config,
            page_size: page_size.max(1),
            download_dir,
            source: None,
            stocks: Vec::new(),
            current_stock: None,
            page: 0,
            query: String::new(),
            last_page: None,
        }
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn level(&self) -> Level {
        match (&self.source, &self.current_stock) {
            (None, _) => Level::Nodes,
            (Some(_), None) => Level::Stocks,
            (Some(_), Some(_)) => Level::Datasets,
        }
    }

    pub fn nodes(&self) -> &[NodeConfig] {
        &self.config.nodes
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub fn current_stock(&self) -> Option<&Stock> {
        self.current_stock.as_ref()
    }

    /// Base URL of the connected node
    pub fn base_url(&self) -> Option<&str> {
        self.source.as_deref().map(|source| source.base_url())
    }

    /// Zero-based page number
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The page currently shown, if it has been fetched
    pub fn last_page(&self) -> Option<&SearchPage> {
        self.last_page.as_ref()
    }

    // =========================================================================
    // Command dispatch
    // =========================================================================

    pub async fn execute(&mut self, command: Command) -> SessionResult<Outcome> {
        match command {
            Command::Empty => return Ok(Outcome::Nothing),
            Command::Quit => return Ok(Outcome::Quit),
            Command::Help => return Ok(Outcome::Help(self.level())),
            _ => {}
        }

        match self.level() {
            Level::Nodes => self.execute_nodes(command),
            Level::Stocks => self.execute_stocks(command).await,
            Level::Datasets => self.execute_datasets(command).await,
        }
    }

    fn execute_nodes(&mut self, command: Command) -> SessionResult<Outcome> {
        match command {
            Command::Number(n) => self.node_target(n),
            Command::Connect(arg) => self.node_target(parse_number(&arg, "node")?),
            Command::Url(arg) => {
                if arg.is_empty() {
                    return Err(SessionError::MissingUrl);
                }
                Ok(Outcome::Connect(ConnectTarget {
                    url: with_scheme(&arg),
                    credentials: None,
                }))
            }
            _ => Err(SessionError::InvalidCommand),
        }
    }

    async fn execute_stocks(&mut self, command: Command) -> SessionResult<Outcome> {
        match command {
            Command::Number(n) => self.select_stock(n).await,
            Command::Select(arg) => self.select_stock(parse_number(&arg, "stock")?).await,
            Command::Download(arg) => {
                let stock = self.stock_at(parse_number(&arg, "stock")?)?;
                Ok(Outcome::Download(stock.clone()))
            }
            Command::Refresh => {
                let source = self.source()?;
                source.invalidate();
                self.stocks = source.stocks().await?;
                Ok(Outcome::Refreshed)
            }
            Command::Back => {
                self.disconnect();
                Ok(Outcome::ShowNodes)
            }
            _ => Err(SessionError::InvalidCommand),
        }
    }

    async fn execute_datasets(&mut self, command: Command) -> SessionResult<Outcome> {
        match command {
            Command::Search(query) => {
                self.query = query;
                self.page = 0;
                self.load_page(0).await?;
                Ok(Outcome::ShowDatasets)
            }
            Command::List => {
                self.query.clear();
                self.page = 0;
                self.load_page(0).await?;
                Ok(Outcome::ShowDatasets)
            }
            Command::Next => self.next_page().await,
            Command::Prev => {
                if self.page == 0 {
                    return Ok(Outcome::Notice("Already at first page"));
                }
                let page = self.page - 1;
                self.load_page(page).await?;
                Ok(Outcome::ShowDatasets)
            }
            Command::Number(n) => self.view(n).await,
            Command::View(arg) => self.view(parse_number(&arg, "dataset")?).await,
            Command::Download(_) => match &self.current_stock {
                Some(stock) => Ok(Outcome::Download(stock.clone())),
                None => Err(SessionError::InvalidCommand),
            },
            Command::Back => {
                self.leave_stock();
                Ok(Outcome::ShowStocks)
            }
            _ => Err(SessionError::InvalidCommand),
        }
    }

    // =========================================================================
    // Connection
    // =========================================================================

    fn node_target(&self, number: usize) -> SessionResult<Outcome> {
        let node = self
            .config
            .node(number)
            .map_err(|_| SessionError::InvalidNode)?;
        Ok(Outcome::Connect(Self::target_for(node)?))
    }

    /// Connection target for a configured node, carrying its credentials
    pub fn target_for(node: &NodeConfig) -> SessionResult<ConnectTarget> {
        let credentials = Credentials::from_parts(node.username.clone(), node.password.clone())?;
        Ok(ConnectTarget {
            url: node.url.clone(),
            credentials,
        })
    }

    /// Connect to a node and load its stocks.
    ///
    /// The session stays disconnected when the node is unreachable or lists
    /// no stocks.
    pub async fn connect(
        &mut self,
        url: &str,
        credentials: Option<Credentials>,
    ) -> SessionResult<Outcome> {
        let source = self
            .connector
            .connect(url, credentials)
            .await
            .map_err(SessionError::ConnectFailed)?;
        let stocks = source.stocks().await.map_err(SessionError::ConnectFailed)?;
        if stocks.is_empty() {
            return Err(SessionError::NoStocks);
        }

        info!(url = source.base_url(), stocks = stocks.len(), "session connected");
        self.source = Some(source);
        self.stocks = stocks;
        self.leave_stock();
        Ok(Outcome::ShowStocks)
    }

    fn disconnect(&mut self) {
        self.leave_stock();
        self.source = None;
        self.stocks.clear();
    }

    fn source(&self) -> SessionResult<Arc<dyn DataSource>> {
        self.source.clone().ok_or(SessionError::InvalidCommand)
    }

    // =========================================================================
    // Stocks
    // =========================================================================

    fn stock_at(&self, number: usize) -> SessionResult<&Stock> {
        number
            .checked_sub(1)
            .and_then(|index| self.stocks.get(index))
            .ok_or(SessionError::InvalidStock)
    }

    async fn select_stock(&mut self, number: usize) -> SessionResult<Outcome> {
        let stock = self.stock_at(number)?.clone();
        debug!(stock = %stock.identifier, "stock selected");
        self.current_stock = Some(stock);
        self.page = 0;
        self.query.clear();
        self.last_page = None;
        self.load_page(0).await?;
        Ok(Outcome::ShowDatasets)
    }

    fn leave_stock(&mut self) {
        self.current_stock = None;
        self.page = 0;
        self.query.clear();
        self.last_page = None;
    }

    /// Download a stock archive into the session's download directory
    pub async fn download(
        &self,
        stock: &Stock,
        progress: DownloadProgress<'_>,
    ) -> SessionResult<PathBuf> {
        let source = self.source()?;
        let path = source
            .download_stock(&stock.identifier, &self.download_dir, progress)
            .await?;
        Ok(path)
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    async fn fetch_page(&self, page: u64) -> SessionResult<SearchPage> {
        let source = self.source()?;
        let stock = self.current_stock.as_ref().ok_or(SessionError::InvalidCommand)?;
        let query = SearchQuery::new(stock.identifier.clone(), self.page_size)
            .with_name(self.query.clone())
            .with_page(page);
        Ok(source.search(&query).await?)
    }

    /// Fetch `page` and make it current
    async fn load_page(&mut self, page: u64) -> SessionResult<()> {
        let result = self.fetch_page(page).await?;
        self.page = page;
        self.last_page = Some(result);
        Ok(())
    }

    async fn next_page(&mut self) -> SessionResult<Outcome> {
        let next = self.page + 1;
        let offset = next * self.page_size;

        let exhausted = self
            .last_page
            .as_ref()
            .and_then(|page| page.has_results_at(offset))
            == Some(false);
        if exhausted {
            return Ok(Outcome::Notice("No more datasets"));
        }

        let result = self.fetch_page(next).await?;
        if result.is_empty() {
            return Ok(Outcome::Notice("No more datasets"));
        }
        self.page = next;
        self.last_page = Some(result);
        Ok(Outcome::ShowDatasets)
    }

    /// Show dataset `number`, counted across pages as in the table
    async fn view(&mut self, number: usize) -> SessionResult<Outcome> {
        if self.last_page.is_none() {
            self.load_page(self.page).await?;
        }
        let first = self.page * self.page_size;
        let identifier = (number as u64)
            .checked_sub(first + 1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| self.last_page.as_ref()?.datasets.get(index))
            .map(|summary| summary.identifier.clone())
            .ok_or(SessionError::InvalidDataset)?;

        let detail = self.source()?.dataset(&identifier).await?;
        Ok(Outcome::ShowDataset(Box::new(detail)))
    }
}

fn parse_number(arg: &str, what: &'static str) -> SessionResult<usize> {
    arg.trim()
        .parse()
        .map_err(|_| SessionError::NotANumber(what))
}

/// Prefix `https://` unless the address already names a scheme
fn with_scheme(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("https://{}", address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_scheme() {
        assert_eq!(with_scheme("oekobaudat.de/OEKOBAU.DAT"), "https://oekobaudat.de/OEKOBAU.DAT");
        assert_eq!(with_scheme("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(with_scheme("https://x.org"), "https://x.org");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 4 ", "stock").unwrap(), 4);
        let err = parse_number("four", "stock").unwrap_err();
        assert_eq!(err.to_string(), "Please provide a valid stock number");
    }

    #[test]
    fn test_connection_failures_offer_retry() {
        assert!(SessionError::NoStocks.is_connection_failure());
        assert!(SessionError::ConnectFailed(FetchError::Network("down".into())).is_connection_failure());
        assert!(!SessionError::InvalidNode.is_connection_failure());
    }
}
