//! Audience Broker Configuration System
//!
//! TOML-based configuration with environment variable overrides. The lambdas
//! are normally configured through environment variables only (`CLIENT_ID`,
//! `TENANT_ID`, `CLIENT_SECRET_SSM`, ...); a TOML file is useful for local runs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub azure: AzureConfig,
    pub secrets: SecretsConfig,
    pub federation: FederationConfig,
    pub dispatch: DispatchConfig,
}

/// Azure cloud environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AzureCloud {
    /// Azure Public Cloud (default)
    #[default]
    Public,
    /// Azure Government Cloud
    Government,
    /// Azure China Cloud
    China,
}

impl AzureCloud {
    /// Login (token issuer) base URL for this cloud
    pub fn login_url(&self) -> &'static str {
        match self {
            Self::Public => "https://login.microsoftonline.com",
            Self::Government => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Graph API base URL for this cloud
    pub fn graph_url(&self) -> &'static str {
        match self {
            Self::Public => "https://graph.microsoft.com",
            Self::Government => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" | "global" => Some(Self::Public),
            "government" | "usgov" => Some(Self::Government),
            "china" => Some(Self::China),
            _ => None,
        }
    }
}

/// Azure AD / Microsoft Graph settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Directory (tenant) ID
    pub tenant_id: String,
    /// Client ID of the provisioning app registration
    pub client_id: String,
    /// Cloud environment
    pub cloud: AzureCloud,
    /// Overrides the cloud's login endpoint (empty = cloud default)
    pub login_endpoint: String,
    /// Overrides the cloud's Graph endpoint (empty = cloud default)
    pub graph_endpoint: String,
    /// Graph API version segment
    pub api_version: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            cloud: AzureCloud::Public,
            login_endpoint: String::new(),
            graph_endpoint: String::new(),
            api_version: "v1.0".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AzureConfig {
    /// Effective login endpoint, without trailing slash
    pub fn login_url(&self) -> String {
        if self.login_endpoint.is_empty() {
            self.cloud.login_url().to_string()
        } else {
            self.login_endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Effective Graph endpoint, without trailing slash
    pub fn graph_url(&self) -> String {
        if self.graph_endpoint.is_empty() {
            self.cloud.graph_url().to_string()
        } else {
            self.graph_endpoint.trim_end_matches('/').to_string()
        }
    }
}

/// Secrets provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Provider type: aws-ps, env
    pub provider: String,
    /// Name of the parameter holding the Azure client secret
    pub client_secret_parameter: String,
    /// AWS region (empty = SDK default chain)
    pub aws_region: String,
    /// Variable prefix for the env provider
    pub env_prefix: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            provider: "aws-ps".to_string(),
            client_secret_parameter: String::new(),
            aws_region: String::new(),
            env_prefix: "AUDIENCE_BROKER_SECRET_".to_string(),
        }
    }
}

/// Trust-policy and OIDC provider settings used by the audience lambdas
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationConfig {
    /// OIDC issuer host/path as registered in IAM (e.g. `sts.windows.net/<tenant>/`)
    pub oidc_url: String,
    /// Role assumed in the target account
    pub cross_account_role_name: String,
}

/// Step Functions targets of the event router
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub create_state_machine_arn: String,
    pub delete_state_machine_arn: String,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check the settings the create/delete lambdas cannot run without.
    pub fn validate_directory(&self) -> Result<(), ConfigError> {
        if self.azure.tenant_id.trim().is_empty() {
            return Err(ConfigError::Missing("TENANT_ID"));
        }
        if self.azure.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("CLIENT_ID"));
        }
        if self.secrets.client_secret_parameter.trim().is_empty() {
            return Err(ConfigError::Missing("CLIENT_SECRET_SSM"));
        }
        if self.azure.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "azure.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check the settings the audience assignment/removal lambdas cannot run without.
    pub fn validate_federation(&self) -> Result<(), ConfigError> {
        if self.federation.oidc_url.trim().is_empty() {
            return Err(ConfigError::Missing("OIDC_URL"));
        }
        if self.federation.cross_account_role_name.trim().is_empty() {
            return Err(ConfigError::Missing("CROSS_ACCOUNT_ROLE_NAME"));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Audience Broker Configuration
# Environment variables override these settings

[azure]
tenant_id = ""
client_id = ""
cloud = "public"  # public, government, china
api_version = "v1.0"
request_timeout_secs = 30

[secrets]
provider = "aws-ps"  # aws-ps, env
client_secret_parameter = "/audience-broker/client-secret"

[federation]
oidc_url = ""
cross_account_role_name = ""

[dispatch]
create_state_machine_arn = ""
delete_state_machine_arn = ""
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.azure.api_version, "v1.0");
        assert_eq!(config.azure.cloud, AzureCloud::Public);
        assert_eq!(config.secrets.provider, "aws-ps");
        assert_eq!(config.azure.graph_url(), "https://graph.microsoft.com");
        assert_eq!(config.azure.login_url(), "https://login.microsoftonline.com");
    }

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.secrets.client_secret_parameter, "/audience-broker/client-secret");
        assert_eq!(config.azure.request_timeout_secs, 30);
    }

    #[test]
    fn test_endpoint_overrides() {
        let mut config = AzureConfig::default();
        config.graph_endpoint = "http://127.0.0.1:9000/".to_string();
        config.cloud = AzureCloud::Government;

        assert_eq!(config.graph_url(), "http://127.0.0.1:9000");
        assert_eq!(config.login_url(), "https://login.microsoftonline.us");
    }

    #[test]
    fn test_validate_directory() {
        let mut config = AppConfig::default();
        assert!(matches!(config.validate_directory(), Err(ConfigError::Missing("TENANT_ID"))));

        config.azure.tenant_id = "tenant".to_string();
        config.azure.client_id = "client".to_string();
        assert!(matches!(
            config.validate_directory(),
            Err(ConfigError::Missing("CLIENT_SECRET_SSM"))
        ));

        config.secrets.client_secret_parameter = "/param".to_string();
        assert!(config.validate_directory().is_ok());
    }

    #[test]
    fn test_validate_federation() {
        let mut config = AppConfig::default();
        config.federation.oidc_url = "sts.windows.net/tenant/".to_string();
        assert!(matches!(
            config.validate_federation(),
            Err(ConfigError::Missing("CROSS_ACCOUNT_ROLE_NAME"))
        ));
    }

    #[test]
    fn test_cloud_parse() {
        assert_eq!(AzureCloud::parse("China"), Some(AzureCloud::China));
        assert_eq!(AzureCloud::parse("usgov"), Some(AzureCloud::Government));
        assert_eq!(AzureCloud::parse("mars"), None);
    }
}
