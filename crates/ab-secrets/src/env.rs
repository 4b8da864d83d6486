//! Environment variable secrets provider

use async_trait::async_trait;
use std::env;
use crate::{Provider, SecretsError};

/// Environment variable secrets provider
///
/// Parameter names are mapped to variable names by upper-casing and replacing
/// `/`, `-` and `.` with `_`, so `/broker/client-secret` with the default prefix
/// reads `AUDIENCE_BROKER_SECRET_BROKER_CLIENT_SECRET`.
pub struct EnvProvider {
    prefix: String,
}

impl EnvProvider {
    pub fn new() -> Self {
        Self { prefix: "AUDIENCE_BROKER_SECRET_".to_string() }
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self { prefix: prefix.to_string() }
    }

    fn env_key(&self, key: &str) -> String {
        let normalized: String = key
            .trim_start_matches('/')
            .chars()
            .map(|c| match c {
                '/' | '-' | '.' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{}", self.prefix, normalized)
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for EnvProvider {
    async fn get(&self, key: &str) -> Result<String, SecretsError> {
        let env_key = self.env_key(key);
        env::var(&env_key).map_err(|_| SecretsError::NotFound(key.to_string()))
    }

    fn name(&self) -> &str {
        "env"
    }
}
