//! SSM Parameter Store backend.
//!
//! The client secret is stored as a SecureString and always read with
//! decryption. Credentials and region come from the standard AWS chain
//! (lambda execution role, env vars, profile).

use async_trait::async_trait;
use aws_sdk_ssm::error::{DisplayErrorContext, SdkError};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::Client;
use tracing::{debug, info};

use crate::{Provider, SecretsError};

/// Reads parameters by their full name (e.g. `/audience-broker/client-secret`).
pub struct AwsParameterStoreProvider {
    client: Client,
}

impl AwsParameterStoreProvider {
    /// Build an SSM client, pinned to `region` when given.
    pub async fn new(region: Option<String>) -> Result<Self, SecretsError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;

        info!(region = ?sdk_config.region(), "Initialized SSM Parameter Store client");
        Ok(Self::from_client(Client::new(&sdk_config)))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_ssm_error<R>(name: &str, err: SdkError<GetParameterError, R>) -> SecretsError
where
    R: std::fmt::Debug,
{
    let missing = matches!(
        err.as_service_error(),
        Some(service_err) if service_err.is_parameter_not_found()
    );
    if missing {
        SecretsError::NotFound(name.to_string())
    } else {
        SecretsError::ProviderError(format!(
            "GetParameter {} failed: {}",
            name,
            DisplayErrorContext(&err)
        ))
    }
}

#[async_trait]
impl Provider for AwsParameterStoreProvider {
    async fn get(&self, key: &str) -> Result<String, SecretsError> {
        debug!(parameter_name = %key, "Reading SecureString parameter");

        let output = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| map_ssm_error(key, e))?;

        match output.parameter().and_then(|p| p.value()) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(SecretsError::NotFound(key.to_string())),
        }
    }

    fn name(&self) -> &str {
        "aws-ps"
    }
}
