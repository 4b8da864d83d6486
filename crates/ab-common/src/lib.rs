//! Audience Broker shared types
//!
//! Types that flow between the lambdas and the library crates:
//! - `RoleEvent` - the `{account, eventName, roleName}` invocation payload
//! - `canonical_app_name` - the directory display name derived from an event
//! - `CreateAudienceResponse` / `DeleteAudienceResponse` - invocation responses
//! - `StepOutcome` - result of a best-effort pipeline step

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod logging;

/// Prefix of every application display name managed by this system.
pub const APP_NAME_PREFIX: &str = "aws-";

/// Scheme prefix of the identifier URI (and trust-policy audience) of an application.
pub const IDENTIFIER_URI_SCHEME: &str = "api://";

// ============================================================================
// Invocation Payload
// ============================================================================

/// IAM role lifecycle event, as forwarded by the event router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleEvent {
    pub account: String,
    #[serde(default)]
    pub event_name: String,
    pub role_name: String,
}

impl RoleEvent {
    pub fn new(
        account: impl Into<String>,
        event_name: impl Into<String>,
        role_name: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            event_name: event_name.into(),
            role_name: role_name.into(),
        }
    }

    /// Parse the raw invocation payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Directory display name for this event's (account, role) pair.
    pub fn app_name(&self) -> String {
        canonical_app_name(&self.account, &self.role_name)
    }
}

/// Derive the canonical application name: `aws-<account>-<role>`.
///
/// Pure and deterministic; the name is the only key used to find the
/// application again, no mapping is stored anywhere.
pub fn canonical_app_name(account: &str, role_name: &str) -> String {
    format!("{}{}-{}", APP_NAME_PREFIX, account, role_name)
}

/// Identifier URI (`api://<appId>`) for an application.
pub fn identifier_uri(app_id: &str) -> String {
    format!("{}{}", IDENTIFIER_URI_SCHEME, app_id)
}

// ============================================================================
// Invocation Responses
// ============================================================================

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Response of the create lambda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAudienceResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub audience: String,
}

impl CreateAudienceResponse {
    pub fn success(audience: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: STATUS_OK,
            headers,
            audience: audience.into(),
        }
    }

    pub fn failure(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            audience: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

/// Response of the delete lambda. `appId` is omitted when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAudienceResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
}

impl DeleteAudienceResponse {
    pub fn success(app_id: impl Into<String>) -> Self {
        Self {
            status_code: STATUS_OK,
            app_id: app_id.into(),
        }
    }

    pub fn failure(status_code: u16) -> Self {
        Self {
            status_code,
            app_id: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

// ============================================================================
// Best-effort Steps
// ============================================================================

/// Outcome of a secondary pipeline step whose failure must not fail the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum StepOutcome {
    Ok,
    Degraded(String),
}

impl StepOutcome {
    /// Fold a step result into an outcome, keeping the error text as the reason.
    pub fn from_result<T, E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => StepOutcome::Ok,
            Err(e) => StepOutcome::Degraded(e.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StepOutcome::Degraded(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StepOutcome::Ok => None,
            StepOutcome::Degraded(reason) => Some(reason),
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Ok => write!(f, "ok"),
            StepOutcome::Degraded(reason) => write!(f, "degraded: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_app_name() {
        assert_eq!(canonical_app_name("111122223333", "deploy"), "aws-111122223333-deploy");
        assert_eq!(
            canonical_app_name("111122223333", "deploy"),
            canonical_app_name("111122223333", "deploy")
        );
        assert_ne!(
            canonical_app_name("111122223333", "deploy"),
            canonical_app_name("111122223333", "deploy2")
        );
    }

    #[test]
    fn test_role_event_parsing() {
        let event = RoleEvent::from_value(serde_json::json!({
            "account": "111122223333",
            "eventName": "CreateRole",
            "roleName": "deploy"
        }))
        .unwrap();

        assert_eq!(event.account, "111122223333");
        assert_eq!(event.event_name, "CreateRole");
        assert_eq!(event.app_name(), "aws-111122223333-deploy");
    }

    #[test]
    fn test_role_event_rejects_missing_role() {
        let result = RoleEvent::from_value(serde_json::json!({"account": "111122223333"}));
        assert!(result.is_err());

        let result = RoleEvent::from_value(serde_json::json!("not an object"));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_response_shape() {
        let json = serde_json::to_value(CreateAudienceResponse::success("app-123")).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["headers"]["Content-Type"], "application/json");
        assert_eq!(json["audience"], "app-123");
    }

    #[test]
    fn test_delete_response_omits_empty_app_id() {
        let json = serde_json::to_value(DeleteAudienceResponse::failure(500)).unwrap();
        assert_eq!(json, serde_json::json!({"statusCode": 500}));

        let json = serde_json::to_value(DeleteAudienceResponse::success("app-123")).unwrap();
        assert_eq!(json["appId"], "app-123");
    }

    #[test]
    fn test_step_outcome_from_result() {
        let ok: Result<(), String> = Ok(());
        assert_eq!(StepOutcome::from_result(ok), StepOutcome::Ok);

        let err: Result<(), String> = Err("boom".to_string());
        let outcome = StepOutcome::from_result(err);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.reason(), Some("boom"));
        assert_eq!(outcome.to_string(), "degraded: boom");
    }

    #[test]
    fn test_identifier_uri() {
        assert_eq!(identifier_uri("abc"), "api://abc");
    }
}
