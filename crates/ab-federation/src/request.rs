//! Step Functions payload of the federation lambdas.

use serde::Deserialize;
use serde_json::Value;

use crate::FederationError;

/// `{ "sfnParam": { "account", "roleName" }, "audience" }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceRequest {
    #[serde(default)]
    pub sfn_param: SfnParam,
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SfnParam {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
}

impl AudienceRequest {
    pub fn from_value(payload: Value) -> Result<Self, FederationError> {
        serde_json::from_value(payload).map_err(|e| FederationError::MissingParameters(e.to_string()))
    }
}

/// A non-empty field, or `MissingParameters` naming it.
pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, FederationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FederationError::MissingParameters(name.to_string()))
}
