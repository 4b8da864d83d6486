//! Microsoft Graph HTTP client.
//!
//! One request per call, bearer token from [`TokenProvider`], OData errors
//! mapped to [`DirectoryError::GraphApi`]. No retries.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{Application, DirectoryError, DirectoryResult, GraphApi, ServicePrincipal, TokenProvider};

const APPLICATION_SELECT: &str = "id,appId,identifierUris,displayName";
const SERVICE_PRINCIPAL_SELECT: &str = "id,appId,displayName";

/// OData error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
struct ODataError {
    error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Collection response wrapper.
#[derive(Debug, Deserialize)]
struct ODataCollection<T> {
    value: Vec<T>,
}

/// Escape a value for use inside a single-quoted OData string literal.
pub fn odata_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Graph client over `reqwest`.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: String,
}

impl GraphClient {
    /// `graph_url` is the Graph endpoint without trailing slash, e.g.
    /// `https://graph.microsoft.com`.
    pub fn new(
        http_client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        graph_url: &str,
        api_version: &str,
    ) -> Self {
        Self {
            http_client,
            tokens,
            base_url: format!("{}/{}", graph_url.trim_end_matches('/'), api_version),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str) -> DirectoryResult<RequestBuilder> {
        let token = self.tokens.token().await?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self.http_client.request(method, url).bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> DirectoryResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.tokens.invalidate();
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ODataError>(&body) {
            Ok(err) => (err.error.code, err.error.message),
            Err(_) => ("Unknown".to_string(), body),
        };
        warn!(status = status.as_u16(), code = %code, "Graph request failed");

        Err(DirectoryError::GraphApi {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> DirectoryResult<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    #[instrument(skip(self))]
    async fn search_applications_by_display_name(
        &self,
        display_name: &str,
        top: usize,
    ) -> DirectoryResult<Vec<Application>> {
        let search = format!("\"displayName:{}\"", display_name);
        let top = top.to_string();
        let request = self
            .request(Method::GET, "/applications")
            .await?
            .header("ConsistencyLevel", "eventual")
            .query(&[
                ("$search", search.as_str()),
                ("$count", "true"),
                ("$orderby", "displayName"),
                ("$select", APPLICATION_SELECT),
                ("$top", top.as_str()),
            ]);

        let page: ODataCollection<Application> = self.send_json(request).await?;
        debug!(matches = page.value.len(), "Application search complete");
        Ok(page.value)
    }

    #[instrument(skip(self))]
    async fn list_applications_by_app_id(&self, app_id: &str) -> DirectoryResult<Vec<Application>> {
        let filter = format!("appId eq '{}'", odata_quote(app_id));
        let request = self
            .request(Method::GET, "/applications")
            .await?
            .query(&[("$filter", filter.as_str()), ("$select", APPLICATION_SELECT)]);

        let page: ODataCollection<Application> = self.send_json(request).await?;
        Ok(page.value)
    }

    #[instrument(skip(self))]
    async fn create_application(&self, display_name: &str) -> DirectoryResult<Application> {
        let request = self
            .request(Method::POST, "/applications")
            .await?
            .json(&json!({ "displayName": display_name }));
        self.send_json(request).await
    }

    #[instrument(skip(self, uris))]
    async fn update_identifier_uris(&self, object_id: &str, uris: &[String]) -> DirectoryResult<()> {
        let request = self
            .request(Method::PATCH, &format!("/applications/{}", object_id))
            .await?
            .json(&json!({ "identifierUris": uris }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_application_by_app_id(&self, app_id: &str) -> DirectoryResult<()> {
        let path = format!("/applications(appId='{}')", odata_quote(app_id));
        let request = self.request(Method::DELETE, &path).await?;
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_service_principal(&self, app_id: &str) -> DirectoryResult<ServicePrincipal> {
        let request = self
            .request(Method::POST, "/servicePrincipals")
            .await?
            .json(&json!({ "appId": app_id }));
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn list_service_principals_by_app_id(
        &self,
        app_id: &str,
    ) -> DirectoryResult<Vec<ServicePrincipal>> {
        let filter = format!("appId eq '{}'", odata_quote(app_id));
        let request = self
            .request(Method::GET, "/servicePrincipals")
            .await?
            .query(&[
                ("$filter", filter.as_str()),
                ("$select", SERVICE_PRINCIPAL_SELECT),
            ]);

        let page: ODataCollection<ServicePrincipal> = self.send_json(request).await?;
        Ok(page.value)
    }

    #[instrument(skip(self))]
    async fn delete_service_principal(&self, object_id: &str) -> DirectoryResult<()> {
        let request = self
            .request(Method::DELETE, &format!("/servicePrincipals/{}", object_id))
            .await?;
        self.send(request).await?;
        Ok(())
    }
}
