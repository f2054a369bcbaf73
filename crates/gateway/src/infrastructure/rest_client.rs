use async_trait::async_trait;
use bwilcd_core::{DatasetDetail, SearchPage, Stock};
use bwilcd_parser::{
    ParseError, enrich_dataset, parse_dataset, parse_datasets_search, parse_flow_info,
    parse_stocks,
};
use bwilcd_ports::{Credentials, DataSource, DownloadProgress, FetchError, SearchQuery};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use super::cache::{Body, ResponseCache};
use crate::config::ClientSettings;

const RESOURCE_SUFFIX: &str = "/resource";
const XML: &str = "application/xml";
const ZIP: &str = "application/zip";

#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Both username and password must be provided for authentication")]
    InvalidCredentials,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for RestError {
    fn from(err: url::ParseError) -> Self {
        RestError::InvalidUrl(err.to_string())
    }
}

/// Convert infrastructure RestError to domain FetchError
impl From<RestError> for FetchError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Http(e) => FetchError::Network(e.to_string()),
            RestError::Status { status, body } => FetchError::Status { status, body },
            RestError::Parse(e) => FetchError::Parse(e),
            RestError::Io(e) => FetchError::Io(e.to_string()),
            RestError::InvalidCredentials => FetchError::InvalidCredentials,
            RestError::InvalidUrl(url) => FetchError::Network(format!("invalid URL: {}", url)),
        }
    }
}

/// Service-API root for a user-supplied server URL: trailing slashes are
/// dropped and `/resource` is appended unless already present.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(RESOURCE_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, RESOURCE_SUFFIX)
    }
}

/// HTTP client for one ILCD node's Service API
///
/// Successful XML responses are memoized per URL; clones share the cache.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    cache: Arc<ResponseCache>,
}

impl RestClient {
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        settings: &ClientSettings,
    ) -> Result<Self, RestError> {
        let base_url = normalize_base_url(base_url);
        Url::parse(&base_url)?;

        let client = Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .timeout(settings.timeout())
            .build()?;

        Ok(RestClient {
            client,
            base_url,
            credentials,
            cache: Arc::new(ResponseCache::new(settings.cache_capacity)),
        })
    }

    /// Like [`RestClient::new`], but takes the credential halves separately
    /// and rejects a username without password (or the reverse).
    pub fn with_login(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
        settings: &ClientSettings,
    ) -> Result<Self, RestError> {
        let credentials =
            Credentials::from_parts(username, password).map_err(|_| RestError::InvalidCredentials)?;
        Self::new(base_url, credentials, settings)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Whether the stock listing answers with 200 OK
    pub async fn test_connection(&self) -> bool {
        let Ok(url) = self.endpoint(&["datastocks"], &[]) else {
            return false;
        };
        match self.request(url).header(ACCEPT, XML).send().await {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(e) => {
                debug!(base = %self.base_url, error = %e, "connection probe failed");
                false
            }
        }
    }

    /// List the node's data stocks
    pub async fn get_stocks(&self) -> Result<Vec<Stock>, RestError> {
        let url = self.endpoint(&["datastocks"], &[])?;
        let body = self.get_xml(url).await?;
        Ok(parse_stocks(&body)?)
    }

    /// Fetch one page of process datasets in a stock
    pub async fn search_datasets(&self, query: &SearchQuery) -> Result<SearchPage, RestError> {
        let start_index = query.start_index().to_string();
        let page_size = query.page_size.to_string();
        let mut params = vec![
            ("startIndex", start_index.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        if query.is_filtered() {
            params.push(("search", "true"));
            params.push(("name", query.name.as_str()));
        }

        let url = self.endpoint(&["datastocks", query.stock.as_str(), "processes"], &params)?;
        let body = self.get_xml(url).await?;
        Ok(parse_datasets_search(&body)?)
    }

    /// Fetch a dataset overview and its flow metadata, then join them
    pub async fn get_dataset(&self, identifier: &str) -> Result<DatasetDetail, RestError> {
        let overview = [("format", "xml"), ("view", "overview")];
        let dataset_url = self.endpoint(&["processes", identifier], &overview)?;
        let flows_url = self.endpoint(&["processes", identifier, "exchanges"], &overview)?;

        let (dataset_body, flows_body) =
            tokio::try_join!(self.get_xml(dataset_url), self.get_xml(flows_url))?;

        let detail = parse_dataset(&dataset_body)?;
        let flows = parse_flow_info(&flows_body)?;
        let detail = enrich_dataset(detail, &flows);

        if detail.has_unmatched_reference_flow() {
            warn!(
                dataset = identifier,
                reference = ?detail.reference_flow_id,
                "reference flow declared but no exchange matches"
            );
        }
        Ok(detail)
    }

    /// Stream a stock export to `{dest_dir}/{stock}.zip`.
    ///
    /// `progress` is called after every chunk. A partial file is removed
    /// when the transfer fails.
    pub async fn download_stock(
        &self,
        stock: &str,
        dest_dir: &Path,
        progress: DownloadProgress<'_>,
    ) -> Result<PathBuf, RestError> {
        let url = self.endpoint(&["datastocks", stock, "export"], &[])?;
        info!(stock, url = %url, "downloading stock export");

        let resp = self.request(url).header(ACCEPT, ZIP).send().await?;
        let resp = check_status(resp).await?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(format!("{}.zip", stock.replace(['/', '\\'], "_")));

        match write_body(resp, &path, progress).await {
            Ok(bytes) => {
                info!(stock, bytes, path = %path.display(), "stock export saved");
                Ok(path)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, RestError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| RestError::InvalidUrl(self.base_url.clone()))?
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }

    async fn get_xml(&self, url: Url) -> Result<Body, RestError> {
        let key = url.to_string();
        if let Some(body) = self.cache.get(&key) {
            debug!(url = %key, "response cache hit");
            return Ok(body);
        }

        let resp = self.request(url).header(ACCEPT, XML).send().await?;
        let bytes = check_status(resp).await?.bytes().await?;
        let body: Body = Arc::from(&bytes[..]);

        debug!(url = %key, bytes = body.len(), "fetched");
        self.cache.insert(key, Arc::clone(&body));
        Ok(body)
    }
}

async fn check_status(resp: Response) -> Result<Response, RestError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RestError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn write_body(
    mut resp: Response,
    path: &Path,
    progress: DownloadProgress<'_>,
) -> Result<u64, RestError> {
    let total = resp.content_length().unwrap_or(0);
    let mut file = tokio::fs::File::create(path).await?;
    let mut received = 0u64;

    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
        progress(received, total);
    }
    file.flush().await?;
    Ok(received)
}

/// Implement DataSource for RestClient (Dependency Inversion)
///
/// Converts infrastructure RestError to domain FetchError so the shell
/// never sees HTTP client types.
#[async_trait]
impl DataSource for RestClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn stocks(&self) -> Result<Vec<Stock>, FetchError> {
        self.get_stocks().await.map_err(FetchError::from)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, FetchError> {
        self.search_datasets(query).await.map_err(FetchError::from)
    }

    async fn dataset(&self, identifier: &str) -> Result<DatasetDetail, FetchError> {
        self.get_dataset(identifier).await.map_err(FetchError::from)
    }

    async fn download_stock(
        &self,
        stock: &str,
        dest_dir: &Path,
        progress: DownloadProgress<'_>,
    ) -> Result<PathBuf, FetchError> {
        RestClient::download_stock(self, stock, dest_dir, progress)
            .await
            .map_err(FetchError::from)
    }

    fn invalidate(&self) {
        self.cache.clear();
    }
}
