//! Client-credentials token acquisition for Microsoft Graph.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{Credentials, DirectoryError, DirectoryResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Acquires and caches an app-only Graph token.
///
/// Tokens are refreshed when they are within the grace period of expiry.
#[derive(Debug)]
pub struct TokenProvider {
    credentials: Credentials,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl TokenProvider {
    /// `login_url` and `graph_url` are base URLs without trailing slash.
    pub fn new(
        credentials: Credentials,
        login_url: &str,
        graph_url: &str,
        http_client: reqwest::Client,
    ) -> Self {
        let token_url = format!("{}/{}/oauth2/v2.0/token", login_url, credentials.tenant_id);
        Self {
            credentials,
            token_url,
            scope: format!("{}/.default", graph_url),
            http_client,
            cached: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Get a valid access token, exchanging credentials if none is cached.
    pub async fn token(&self) -> DirectoryResult<String> {
        let cached = self
            .cached
            .read()
            .as_ref()
            .filter(|token| !token.is_expired(self.grace_period))
            .map(|token| token.access_token.clone());
        if let Some(access_token) = cached {
            return Ok(access_token);
        }

        let fresh = self.acquire().await?;
        let access_token = fresh.access_token.clone();
        *self.cached.write() = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }

    #[instrument(skip(self), fields(tenant_id = %self.credentials.tenant_id, client_id = %self.credentials.client_id))]
    async fn acquire(&self) -> DirectoryResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Auth(format!(
                "Token request failed with status {}: {}",
                status.as_u16(),
                token_error_summary(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Failed to parse token response: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(DirectoryError::Auth("Token response carried no access token".to_string()));
        }

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        debug!(expires_at = %expires_at.format("%Y-%m-%d %H:%M:%S UTC"), "Acquired Graph token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// `error: error_description` of an AAD error body, or the raw body.
fn token_error_summary(body: &str) -> String {
    #[derive(Deserialize)]
    struct AadError {
        error: String,
        #[serde(default)]
        error_description: String,
    }

    match serde_json::from_str::<AadError>(body) {
        Ok(err) if err.error_description.is_empty() => err.error,
        Ok(err) => {
            let first_line = err.error_description.lines().next().unwrap_or_default();
            format!("{}: {}", err.error, first_line)
        }
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };
        assert!(!token.is_expired(Duration::minutes(5)));
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn test_token_url_and_scope() {
        let provider = TokenProvider::new(
            Credentials::new("tenant-1", "client-1", "s"),
            "https://login.microsoftonline.com",
            "https://graph.microsoft.com",
            reqwest::Client::new(),
        );
        assert_eq!(
            provider.token_url(),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
        assert_eq!(provider.scope, "https://graph.microsoft.com/.default");
    }

    #[test]
    fn test_token_error_summary() {
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret.\r\nTrace ID: x"}"#;
        assert_eq!(
            token_error_summary(body),
            "invalid_client: AADSTS7000215: Invalid client secret."
        );
        assert_eq!(token_error_summary("gateway timeout"), "gateway timeout");
    }
}
