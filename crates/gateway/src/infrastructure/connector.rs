use async_trait::async_trait;
use bwilcd_ports::{Connector, Credentials, DataSource, FetchError};
use std::sync::Arc;
use tracing::info;

use super::rest_client::RestClient;
use crate::config::ClientSettings;

/// Opens [`RestClient`]s and probes them before handing them out
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    settings: ClientSettings,
}

impl HttpConnector {
    pub fn new(settings: ClientSettings) -> Self {
        HttpConnector { settings }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(
        &self,
        url: &str,
        credentials: Option<Credentials>,
    ) -> Result<Arc<dyn DataSource>, FetchError> {
        let client = RestClient::new(url, credentials, &self.settings)?;

        if !client.test_connection().await {
            return Err(FetchError::Network(format!(
                "could not reach {}",
                client.base_url()
            )));
        }

        info!(base = client.base_url(), "connected");
        Ok(Arc::new(client))
    }
}
