//! Writes the audience into the web-identity trust policy of a new role.

use ab_config::FederationConfig;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::policy::{assign_audience, audience_uri, cross_account_role_arn};
use crate::request::{required, AudienceRequest};
use crate::{AccountAccess, FederationError};

pub const ASSIGN_SESSION_NAME: &str = "UpdateTrustRelationshipSession";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignAudienceOutput {
    pub status: String,
    pub role_name: String,
    pub account: String,
    pub audience: String,
}

pub struct AudienceAssigner {
    config: FederationConfig,
    access: Arc<dyn AccountAccess>,
}

impl AudienceAssigner {
    pub fn new(config: FederationConfig, access: Arc<dyn AccountAccess>) -> Self {
        Self { config, access }
    }

    #[instrument(skip_all)]
    pub async fn handle(&self, payload: Value) -> Result<AssignAudienceOutput, FederationError> {
        let request = AudienceRequest::from_value(payload)?;
        let account = required(&request.sfn_param.account, "sfnParam.account")?;
        let role_name = required(&request.sfn_param.role_name, "sfnParam.roleName")?;
        let audience = required(&request.audience, "audience")?;
        let oidc_url = required_setting(&self.config.oidc_url, "OIDC_URL")?;
        let broker_role = required_setting(&self.config.cross_account_role_name, "CROSS_ACCOUNT_ROLE_NAME")?;

        info!(account, role_name, audience, "Assigning audience to role trust policy");

        let iam = self
            .access
            .assume(&cross_account_role_arn(account, broker_role), ASSIGN_SESSION_NAME)
            .await?;

        let mut policy = iam.get_trust_policy(role_name).await?;
        let updated = assign_audience(&mut policy, account, oidc_url, &audience_uri(audience))?;
        iam.update_trust_policy(role_name, &policy).await?;

        info!(account, role_name, statements = updated, "Trust relationship updated");

        Ok(AssignAudienceOutput {
            status: "success".to_string(),
            role_name: role_name.to_string(),
            account: account.to_string(),
            audience: audience.to_string(),
        })
    }
}

pub(crate) fn required_setting<'a>(value: &'a str, name: &str) -> Result<&'a str, FederationError> {
    Some(value.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FederationError::MissingParameters(name.to_string()))
}
