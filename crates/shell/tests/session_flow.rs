//! Session behavior against an in-memory node

use async_trait::async_trait;
use bwilcd::{Command, Level, Outcome, Session, SessionError};
use bwilcd_core::{DatasetDetail, DatasetSummary, SearchPage, Stock};
use bwilcd_gateway::{ClientSettings, NodeConfig, NodesConfig};
use bwilcd_ports::{
    Connector, Credentials, DataSource, DownloadProgress, FetchError, FetchResult, SearchQuery,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// In-memory node
// =============================================================================

struct FakeSource {
    stocks: Vec<Stock>,
    datasets: Vec<DatasetSummary>,
    declare_total: bool,
    queries: Mutex<Vec<SearchQuery>>,
    invalidations: AtomicUsize,
}

impl FakeSource {
    fn new(dataset_count: usize, declare_total: bool) -> Self {
        FakeSource {
            stocks: vec![
                Stock::new("s-1", "Default").with_description("All processes"),
                Stock::new("s-2", "Archive"),
            ],
            datasets: (1..=dataset_count)
                .map(|i| DatasetSummary::new(format!("p-{}", i), format!("Process {}", i)))
                .collect(),
            declare_total,
            queries: Mutex::new(Vec::new()),
            invalidations: AtomicUsize::new(0),
        }
    }

    fn without_stocks() -> Self {
        FakeSource {
            stocks: Vec::new(),
            ..FakeSource::new(0, true)
        }
    }

    fn query_count(&self) -> usize {
        self.queries.lock().len()
    }

    fn last_query(&self) -> Option<SearchQuery> {
        self.queries.lock().last().cloned()
    }
}

#[async_trait]
impl DataSource for FakeSource {
    fn base_url(&self) -> &str {
        "https://node.test/resource"
    }

    async fn stocks(&self) -> FetchResult<Vec<Stock>> {
        Ok(self.stocks.clone())
    }

    async fn search(&self, query: &SearchQuery) -> FetchResult<SearchPage> {
        self.queries.lock().push(query.clone());

        let matching: Vec<DatasetSummary> = self
            .datasets
            .iter()
            .filter(|d| query.name.is_empty() || d.name.contains(&query.name))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let datasets = matching
            .into_iter()
            .skip(query.start_index() as usize)
            .take(query.page_size as usize)
            .collect();

        let mut page = SearchPage::new(datasets);
        if self.declare_total {
            page.total_size = Some(total);
        }
        Ok(page)
    }

    async fn dataset(&self, identifier: &str) -> FetchResult<DatasetDetail> {
        Ok(DatasetDetail {
            identifier: Some(identifier.to_string()),
            name: Some(format!("Detail of {}", identifier)),
            ..Default::default()
        })
    }

    async fn download_stock(
        &self,
        stock: &str,
        dest_dir: &Path,
        progress: DownloadProgress<'_>,
    ) -> FetchResult<PathBuf> {
        let path = dest_dir.join(format!("{}.zip", stock));
        std::fs::write(&path, b"PK").map_err(|e| FetchError::Io(e.to_string()))?;
        progress(2, 2);
        Ok(path)
    }

    fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeConnector {
    source: Option<Arc<FakeSource>>,
    calls: Mutex<Vec<(String, Option<Credentials>)>>,
}

impl FakeConnector {
    fn reaching(source: Arc<FakeSource>) -> Self {
        FakeConnector {
            source: Some(source),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        FakeConnector {
            source: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        url: &str,
        credentials: Option<Credentials>,
    ) -> FetchResult<Arc<dyn DataSource>> {
        self.calls.lock().push((url.to_string(), credentials));
        match &self.source {
            Some(source) => Ok(source.clone()),
            None => Err(FetchError::Network(format!("could not reach {}", url))),
        }
    }
}

fn nodes() -> NodesConfig {
    let mut private = NodeConfig::new("Private", "https://private.test");
    private.username = Some("user".into());
    private.password = Some("pass".into());
    NodesConfig {
        nodes: vec![NodeConfig::new("Public", "https://public.test"), private],
        client: ClientSettings::default(),
    }
}

fn session_with(connector: Arc<FakeConnector>) -> Session {
    Session::new(connector, nodes(), 20, PathBuf::from("unused"))
}

async fn connected(source: Arc<FakeSource>) -> Session {
    let mut session = session_with(Arc::new(FakeConnector::reaching(source)));
    session.connect("https://public.test", None).await.unwrap();
    session
}

async fn run(session: &mut Session, line: &str) -> Result<Outcome, SessionError> {
    session.execute(Command::parse(line)).await
}

// =============================================================================
// Nodes level
// =============================================================================

#[tokio::test]
async fn test_node_selection_resolves_target() {
    let mut session = session_with(Arc::new(FakeConnector::unreachable()));
    assert_eq!(session.level(), Level::Nodes);

    let Outcome::Connect(target) = run(&mut session, "1").await.unwrap() else {
        panic!("expected a connect outcome");
    };
    assert_eq!(target.url, "https://public.test");
    assert!(target.needs_login());

    let Outcome::Connect(target) = run(&mut session, "connect 2").await.unwrap() else {
        panic!("expected a connect outcome");
    };
    assert_eq!(target.credentials, Some(Credentials::new("user", "pass")));
    assert!(!target.needs_login());

    assert!(matches!(run(&mut session, "c 3").await, Err(SessionError::InvalidNode)));
    assert!(matches!(run(&mut session, "0").await, Err(SessionError::InvalidNode)));
    assert!(matches!(
        run(&mut session, "c first").await,
        Err(SessionError::NotANumber("node"))
    ));
}

#[test]
fn test_half_configured_login_rejected() {
    let mut node = NodeConfig::new("Broken", "https://broken.test");
    node.username = Some("user".into());

    assert!(matches!(
        Session::target_for(&node),
        Err(SessionError::Fetch(FetchError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_custom_url() {
    let mut session = session_with(Arc::new(FakeConnector::unreachable()));

    let Outcome::Connect(target) = run(&mut session, "url Node.Example/OEKOBAU.DAT").await.unwrap()
    else {
        panic!("expected a connect outcome");
    };
    assert_eq!(target.url, "https://Node.Example/OEKOBAU.DAT");

    assert!(matches!(run(&mut session, "url").await, Err(SessionError::MissingUrl)));
    assert!(matches!(run(&mut session, "next").await, Err(SessionError::InvalidCommand)));
    assert_eq!(run(&mut session, "help").await.unwrap(), Outcome::Help(Level::Nodes));
    assert_eq!(run(&mut session, "").await.unwrap(), Outcome::Nothing);
}

#[tokio::test]
async fn test_connect_passes_credentials() {
    let connector = Arc::new(FakeConnector::reaching(Arc::new(FakeSource::new(3, true))));
    let mut session = session_with(connector.clone());

    let outcome = session
        .connect("https://private.test", Some(Credentials::new("user", "pass")))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::ShowStocks);
    assert_eq!(session.level(), Level::Stocks);
    assert_eq!(session.stocks().len(), 2);
    assert_eq!(session.base_url(), Some("https://node.test/resource"));

    let calls = connector.calls.lock();
    assert_eq!(calls[0].0, "https://private.test");
    assert_eq!(calls[0].1, Some(Credentials::new("user", "pass")));
}

#[tokio::test]
async fn test_connect_failures_keep_session_disconnected() {
    let mut session = session_with(Arc::new(FakeConnector::unreachable()));
    let err = session.connect("https://down.test", None).await.unwrap_err();
    assert!(matches!(err, SessionError::ConnectFailed(FetchError::Network(_))));
    assert!(err.is_connection_failure());
    assert_eq!(session.level(), Level::Nodes);

    let empty = Arc::new(FakeConnector::reaching(Arc::new(FakeSource::without_stocks())));
    let mut session = session_with(empty);
    let err = session.connect("https://empty.test", None).await.unwrap_err();
    assert!(matches!(err, SessionError::NoStocks));
    assert_eq!(session.level(), Level::Nodes);
}

// =============================================================================
// Stocks level
// =============================================================================

#[tokio::test]
async fn test_select_stock_loads_first_page() {
    let source = Arc::new(FakeSource::new(45, true));
    let mut session = connected(source.clone()).await;

    assert!(matches!(run(&mut session, "sl 3").await, Err(SessionError::InvalidStock)));
    assert_eq!(run(&mut session, "select 1").await.unwrap(), Outcome::ShowDatasets);

    assert_eq!(session.level(), Level::Datasets);
    assert_eq!(session.current_stock().map(|s| s.name.as_str()), Some("Default"));
    assert_eq!(session.page(), 0);
    assert_eq!(session.last_page().map(SearchPage::len), Some(20));

    let query = source.last_query().unwrap();
    assert_eq!(query.stock, "s-1");
    assert_eq!(query.start_index(), 0);
    assert_eq!(query.page_size, 20);
}

#[tokio::test]
async fn test_refresh_invalidates_cache() {
    let source = Arc::new(FakeSource::new(1, true));
    let mut session = connected(source.clone()).await;

    assert_eq!(run(&mut session, "r").await.unwrap(), Outcome::Refreshed);
    assert_eq!(source.invalidations.load(Ordering::SeqCst), 1);
    assert_eq!(session.stocks().len(), 2);
}

#[tokio::test]
async fn test_download_from_stocks_level() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(FakeSource::new(1, true));
    let connector = Arc::new(FakeConnector::reaching(source));
    let mut session = Session::new(connector, nodes(), 20, dir.path().to_path_buf());
    session.connect("https://public.test", None).await.unwrap();

    assert!(matches!(
        run(&mut session, "d").await,
        Err(SessionError::NotANumber("stock"))
    ));
    assert!(matches!(run(&mut session, "dd 9").await, Err(SessionError::InvalidStock)));

    let Outcome::Download(stock) = run(&mut session, "dd 2").await.unwrap() else {
        panic!("expected a download outcome");
    };
    assert_eq!(stock.identifier, "s-2");

    let seen = Mutex::new(Vec::new());
    let progress = |received: u64, total: u64| seen.lock().push((received, total));
    let path = session.download(&stock, &progress).await.unwrap();

    assert_eq!(path, dir.path().join("s-2.zip"));
    assert!(path.exists());
    assert_eq!(*seen.lock(), vec![(2, 2)]);
}

#[tokio::test]
async fn test_back_navigation() {
    let mut session = connected(Arc::new(FakeSource::new(5, true))).await;
    run(&mut session, "1").await.unwrap();
    assert_eq!(session.level(), Level::Datasets);

    assert_eq!(run(&mut session, "b").await.unwrap(), Outcome::ShowStocks);
    assert_eq!(session.level(), Level::Stocks);
    assert!(session.last_page().is_none());

    assert_eq!(run(&mut session, "back").await.unwrap(), Outcome::ShowNodes);
    assert_eq!(session.level(), Level::Nodes);
    assert!(session.stocks().is_empty());
    assert!(matches!(run(&mut session, "back").await, Err(SessionError::InvalidCommand)));
}

// =============================================================================
// Datasets level
// =============================================================================

#[tokio::test]
async fn test_paging_with_declared_total() {
    let source = Arc::new(FakeSource::new(45, true));
    let mut session = connected(source.clone()).await;
    run(&mut session, "1").await.unwrap();

    assert_eq!(run(&mut session, "n").await.unwrap(), Outcome::ShowDatasets);
    assert_eq!(run(&mut session, "next").await.unwrap(), Outcome::ShowDatasets);
    assert_eq!(session.page(), 2);
    assert_eq!(session.last_page().map(SearchPage::len), Some(5));
    assert_eq!(source.last_query().unwrap().start_index(), 40);

    // Total of 45 is known, so the fourth page is never requested
    let requests = source.query_count();
    assert_eq!(
        run(&mut session, "n").await.unwrap(),
        Outcome::Notice("No more datasets")
    );
    assert_eq!(source.query_count(), requests);
    assert_eq!(session.page(), 2);

    assert_eq!(run(&mut session, "p").await.unwrap(), Outcome::ShowDatasets);
    assert_eq!(run(&mut session, "prev").await.unwrap(), Outcome::ShowDatasets);
    assert_eq!(session.page(), 0);
    assert_eq!(
        run(&mut session, "p").await.unwrap(),
        Outcome::Notice("Already at first page")
    );
}

#[tokio::test]
async fn test_paging_without_declared_total_stops_on_empty_page() {
    let source = Arc::new(FakeSource::new(20, false));
    let mut session = connected(source.clone()).await;
    run(&mut session, "1").await.unwrap();

    assert_eq!(
        run(&mut session, "n").await.unwrap(),
        Outcome::Notice("No more datasets")
    );
    assert_eq!(source.last_query().unwrap().page, 1);
    assert_eq!(session.page(), 0);
    assert_eq!(session.last_page().map(SearchPage::len), Some(20));
}

#[tokio::test]
async fn test_search_and_list() {
    let source = Arc::new(FakeSource::new(30, true));
    let mut session = connected(source.clone()).await;
    run(&mut session, "1").await.unwrap();
    run(&mut session, "n").await.unwrap();

    assert_eq!(run(&mut session, "s Process 2").await.unwrap(), Outcome::ShowDatasets);
    assert_eq!(session.page(), 0);
    assert_eq!(session.query(), "Process 2");
    let query = source.last_query().unwrap();
    assert_eq!(query.name, "Process 2");
    assert!(query.is_filtered());
    // "Process 2" and "Process 20".."Process 29"
    assert_eq!(session.last_page().and_then(|p| p.total_size), Some(11));

    assert_eq!(run(&mut session, "ll").await.unwrap(), Outcome::ShowDatasets);
    assert_eq!(session.query(), "");
    assert!(!source.last_query().unwrap().is_filtered());
}

#[tokio::test]
async fn test_view_uses_absolute_row_numbers() {
    let source = Arc::new(FakeSource::new(45, true));
    let mut session = connected(source).await;
    run(&mut session, "1").await.unwrap();
    run(&mut session, "n").await.unwrap();

    let Outcome::ShowDataset(detail) = run(&mut session, "21").await.unwrap() else {
        panic!("expected a dataset");
    };
    assert_eq!(detail.identifier.as_deref(), Some("p-21"));

    let Outcome::ShowDataset(detail) = run(&mut session, "v 40").await.unwrap() else {
        panic!("expected a dataset");
    };
    assert_eq!(detail.identifier.as_deref(), Some("p-40"));

    for line in ["5", "41", "0", "view 20"] {
        assert!(
            matches!(run(&mut session, line).await, Err(SessionError::InvalidDataset)),
            "line {:?}",
            line
        );
    }
    assert!(matches!(
        run(&mut session, "view").await,
        Err(SessionError::NotANumber("dataset"))
    ));
}

#[tokio::test]
async fn test_download_current_stock() {
    let mut session = connected(Arc::new(FakeSource::new(1, true))).await;
    run(&mut session, "2").await.unwrap();

    let Outcome::Download(stock) = run(&mut session, "d").await.unwrap() else {
        panic!("expected a download outcome");
    };
    assert_eq!(stock.identifier, "s-2");
    assert!(matches!(run(&mut session, "refresh").await, Err(SessionError::InvalidCommand)));
    assert_eq!(run(&mut session, "h").await.unwrap(), Outcome::Help(Level::Datasets));
    assert_eq!(run(&mut session, "q").await.unwrap(), Outcome::Quit);
}
