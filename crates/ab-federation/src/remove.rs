//! Removes an audience from the target account's OIDC identity provider.

use ab_config::FederationConfig;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::assign::required_setting;
use crate::policy::{audience_uri, cross_account_role_arn, oidc_provider_arn};
use crate::request::{required, AudienceRequest};
use crate::{AccountAccess, FederationError};

pub const REMOVE_SESSION_NAME: &str = "AddOIDCAudience";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveAudienceOutput {
    pub status: String,
    pub account: String,
    pub oidc_url: String,
    pub audience: String,
}

pub struct AudienceRemover {
    config: FederationConfig,
    access: Arc<dyn AccountAccess>,
}

impl AudienceRemover {
    pub fn new(config: FederationConfig, access: Arc<dyn AccountAccess>) -> Self {
        Self { config, access }
    }

    #[instrument(skip_all)]
    pub async fn handle(&self, payload: Value) -> Result<RemoveAudienceOutput, FederationError> {
        let request = AudienceRequest::from_value(payload)?;
        let account = required(&request.sfn_param.account, "sfnParam.account")?;
        let audience = audience_uri(required(&request.audience, "audience")?);
        let oidc_url = required_setting(&self.config.oidc_url, "OIDC_URL")?;
        let broker_role = required_setting(&self.config.cross_account_role_name, "CROSS_ACCOUNT_ROLE_NAME")?;

        let provider_arn = oidc_provider_arn(account, oidc_url);
        info!(account, provider_arn = %provider_arn, audience = %audience, "Removing audience from OIDC provider");

        let iam = self
            .access
            .assume(&cross_account_role_arn(account, broker_role), REMOVE_SESSION_NAME)
            .await?;
        iam.remove_oidc_client_id(&provider_arn, &audience).await?;

        info!(account, "OIDC provider audience removed");

        Ok(RemoveAudienceOutput {
            status: "success".to_string(),
            account: account.to_string(),
            oidc_url: oidc_url.to_string(),
            audience,
        })
    }
}
