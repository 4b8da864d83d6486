//! Cross-account IAM access.
//!
//! [`AccountAccess`] assumes the broker role in a target account and hands
//! back an [`AccountIam`] bound to the temporary credentials.

use async_trait::async_trait;
use aws_config::SdkConfig;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::policy::decode_policy_document;
use crate::FederationError;

/// The IAM calls made in a target account.
#[async_trait]
pub trait AccountIam: Send + Sync {
    /// Trust (assume-role) policy of `role_name`, parsed.
    async fn get_trust_policy(&self, role_name: &str) -> Result<Value, FederationError>;

    async fn update_trust_policy(&self, role_name: &str, policy: &Value) -> Result<(), FederationError>;

    async fn remove_oidc_client_id(
        &self,
        provider_arn: &str,
        client_id: &str,
    ) -> Result<(), FederationError>;
}

/// Obtains IAM access to a target account by assuming a role there.
#[async_trait]
pub trait AccountAccess: Send + Sync {
    async fn assume(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<Box<dyn AccountIam>, FederationError>;
}

// ============================================================================
// STS / IAM implementation
// ============================================================================

/// [`AccountAccess`] over `aws-sdk-sts`, producing `aws-sdk-iam` clients.
pub struct StsAccountAccess {
    sdk_config: SdkConfig,
    sts: aws_sdk_sts::Client,
}

impl StsAccountAccess {
    pub async fn new(region: Option<String>) -> Self {
        let sdk_config = if let Some(region) = region {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region))
                .load()
                .await
        } else {
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
        };

        info!("Initialized STS client");
        Self::from_config(sdk_config)
    }

    pub fn from_config(sdk_config: SdkConfig) -> Self {
        let sts = aws_sdk_sts::Client::new(&sdk_config);
        Self { sdk_config, sts }
    }
}

#[async_trait]
impl AccountAccess for StsAccountAccess {
    #[instrument(skip(self))]
    async fn assume(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<Box<dyn AccountIam>, FederationError> {
        let response = self
            .sts
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|e| FederationError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: aws_sdk_sts::error::DisplayErrorContext(&e).to_string(),
            })?;

        let credentials = response.credentials().ok_or_else(|| FederationError::AssumeRole {
            role_arn: role_arn.to_string(),
            message: "response carried no credentials".to_string(),
        })?;

        let provider = aws_sdk_iam::config::Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            Some(credentials.session_token().to_string()),
            None,
            "ab-federation-assume-role",
        );
        let iam_config = aws_sdk_iam::config::Builder::from(&self.sdk_config)
            .credentials_provider(provider)
            .build();

        debug!("Assumed cross-account role");
        Ok(Box::new(IamClient {
            client: aws_sdk_iam::Client::from_conf(iam_config),
        }))
    }
}

struct IamClient {
    client: aws_sdk_iam::Client,
}

fn iam_error<E, R>(action: &str, err: aws_sdk_iam::error::SdkError<E, R>) -> FederationError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    FederationError::Iam {
        action: action.to_string(),
        message: aws_sdk_iam::error::DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl AccountIam for IamClient {
    async fn get_trust_policy(&self, role_name: &str) -> Result<Value, FederationError> {
        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| iam_error("GetRole", e))?;

        let document = output
            .role()
            .and_then(|role| role.assume_role_policy_document())
            .ok_or_else(|| {
                FederationError::MalformedPolicy(format!("role {} has no trust policy", role_name))
            })?;

        decode_policy_document(document)
    }

    async fn update_trust_policy(&self, role_name: &str, policy: &Value) -> Result<(), FederationError> {
        self.client
            .update_assume_role_policy()
            .role_name(role_name)
            .policy_document(policy.to_string())
            .send()
            .await
            .map_err(|e| iam_error("UpdateAssumeRolePolicy", e))?;
        Ok(())
    }

    async fn remove_oidc_client_id(
        &self,
        provider_arn: &str,
        client_id: &str,
    ) -> Result<(), FederationError> {
        self.client
            .remove_client_id_from_open_id_connect_provider()
            .open_id_connect_provider_arn(provider_arn)
            .client_id(client_id)
            .send()
            .await
            .map_err(|e| iam_error("RemoveClientIDFromOpenIDConnectProvider", e))?;
        Ok(())
    }
}
