//! Authentication seam: turns credentials into a [`DirectoryClient`].

use ab_config::AzureConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::{
    Credentials, DirectoryClient, DirectoryError, DirectoryResult, GraphApi, GraphClient,
    TokenProvider,
};

/// Establishes an authenticated directory session.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Exchange `credentials` for a session. Fails with `Auth` when the
    /// exchange is rejected.
    async fn connect(&self, credentials: Credentials) -> DirectoryResult<DirectoryClient>;
}

/// Connector for the real Microsoft Graph.
#[derive(Debug, Clone)]
pub struct GraphConnector {
    login_url: String,
    graph_url: String,
    api_version: String,
    http_client: reqwest::Client,
}

impl GraphConnector {
    pub fn new(config: &AzureConfig) -> DirectoryResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| DirectoryError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            login_url: config.login_url(),
            graph_url: config.graph_url(),
            api_version: config.api_version.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl DirectoryConnector for GraphConnector {
    #[instrument(skip_all, fields(tenant_id = %credentials.tenant_id))]
    async fn connect(&self, credentials: Credentials) -> DirectoryResult<DirectoryClient> {
        let tokens = Arc::new(TokenProvider::new(
            credentials,
            &self.login_url,
            &self.graph_url,
            self.http_client.clone(),
        ));

        // Authenticate up front so bad credentials fail before any directory call.
        tokens.token().await?;
        info!("Authenticated against Microsoft Graph");

        let graph: Arc<dyn GraphApi> = Arc::new(GraphClient::new(
            self.http_client.clone(),
            tokens,
            &self.graph_url,
            &self.api_version,
        ));
        Ok(DirectoryClient::new(graph))
    }
}

/// Connector handing out sessions over a fixed [`GraphApi`], skipping
/// authentication unless told to reject it.
pub struct StaticConnector {
    graph: Arc<dyn GraphApi>,
    reject_auth: bool,
}

impl StaticConnector {
    pub fn new(graph: Arc<dyn GraphApi>) -> Self {
        Self {
            graph,
            reject_auth: false,
        }
    }

    /// Connector whose every `connect` fails with `Auth`.
    pub fn rejecting(graph: Arc<dyn GraphApi>) -> Self {
        Self {
            graph,
            reject_auth: true,
        }
    }
}

#[async_trait]
impl DirectoryConnector for StaticConnector {
    async fn connect(&self, credentials: Credentials) -> DirectoryResult<DirectoryClient> {
        if self.reject_auth || credentials.client_id.is_empty() {
            return Err(DirectoryError::Auth(format!(
                "Credentials rejected for client {}",
                credentials.client_id
            )));
        }
        Ok(DirectoryClient::new(Arc::clone(&self.graph)))
    }
}
