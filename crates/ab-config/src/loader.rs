//! Configuration loader with file and environment variable support

use crate::{AppConfig, AzureCloud, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "audience-broker.toml",
    "config.toml",
    "./config/audience-broker.toml",
    "/etc/audience-broker/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load), reading overrides through `lookup` instead of the process environment.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Some(path) = lookup("AUDIENCE_BROKER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment variable overrides.
///
/// The unprefixed names are the ones the deployed lambdas are configured with.
fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // Azure
    if let Some(val) = lookup("TENANT_ID") {
        config.azure.tenant_id = val;
    }
    if let Some(val) = lookup("CLIENT_ID") {
        config.azure.client_id = val;
    }
    if let Some(val) = lookup("AZURE_CLOUD") {
        match AzureCloud::parse(&val) {
            Some(cloud) => config.azure.cloud = cloud,
            None => warn!(value = %val, "Ignoring unknown AZURE_CLOUD"),
        }
    }
    if let Some(val) = lookup("AZURE_LOGIN_ENDPOINT") {
        config.azure.login_endpoint = val;
    }
    if let Some(val) = lookup("GRAPH_ENDPOINT") {
        config.azure.graph_endpoint = val;
    }
    if let Some(val) = lookup("GRAPH_API_VERSION") {
        config.azure.api_version = val;
    }
    if let Some(val) = lookup("GRAPH_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.azure.request_timeout_secs = secs;
        }
    }

    // Secrets
    if let Some(val) = lookup("CLIENT_SECRET_SSM") {
        config.secrets.client_secret_parameter = val;
    }
    if let Some(val) = lookup("AUDIENCE_BROKER_SECRETS_PROVIDER") {
        config.secrets.provider = val;
    }
    if let Some(val) = lookup("AUDIENCE_BROKER_SECRETS_AWS_REGION") {
        config.secrets.aws_region = val;
    }

    // Federation
    if let Some(val) = lookup("OIDC_URL") {
        config.federation.oidc_url = val;
    }
    if let Some(val) = lookup("CROSS_ACCOUNT_ROLE_NAME") {
        config.federation.cross_account_role_name = val;
    }

    // Dispatch
    if let Some(val) = lookup("CREATE_ROLE_SFN_ARN") {
        config.dispatch.create_state_machine_arn = val;
    }
    if let Some(val) = lookup("DELETE_ROLE_SFN_ARN") {
        config.dispatch.delete_state_machine_arn = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_only_configuration() {
        let loader = ConfigLoader::with_path("/nonexistent/audience-broker.toml");
        let config = loader
            .load_with(lookup_from(&[
                ("TENANT_ID", "tenant-1"),
                ("CLIENT_ID", "client-1"),
                ("CLIENT_SECRET_SSM", "/broker/secret"),
            ]))
            .unwrap();

        assert_eq!(config.azure.tenant_id, "tenant-1");
        assert_eq!(config.azure.client_id, "client-1");
        assert_eq!(config.secrets.client_secret_parameter, "/broker/secret");
        assert!(config.validate_directory().is_ok());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[azure]
tenant_id = "file-tenant"
client_id = "file-client"
cloud = "china"

[federation]
oidc_url = "sts.windows.net/file/"
"#
        )
        .unwrap();

        let loader = ConfigLoader::with_path(file.path());
        let config = loader
            .load_with(lookup_from(&[
                ("TENANT_ID", "env-tenant"),
                ("AZURE_CLOUD", "public"),
                ("GRAPH_TIMEOUT_SECS", "not-a-number"),
            ]))
            .unwrap();

        assert_eq!(config.azure.tenant_id, "env-tenant");
        assert_eq!(config.azure.client_id, "file-client");
        assert_eq!(config.azure.cloud, AzureCloud::Public);
        assert_eq!(config.azure.request_timeout_secs, 30);
        assert_eq!(config.federation.oidc_url, "sts.windows.net/file/");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[azure\ntenant_id = ").unwrap();

        let result = ConfigLoader::with_path(file.path()).load_with(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_dispatch_overrides() {
        let config = ConfigLoader::with_path("/nonexistent.toml")
            .load_with(lookup_from(&[
                ("CREATE_ROLE_SFN_ARN", "arn:create"),
                ("DELETE_ROLE_SFN_ARN", "arn:delete"),
            ]))
            .unwrap();

        assert_eq!(config.dispatch.create_state_machine_arn, "arn:create");
        assert_eq!(config.dispatch.delete_state_machine_arn, "arn:delete");
    }
}
