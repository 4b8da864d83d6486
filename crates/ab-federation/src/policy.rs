//! Trust policy rewriting.
//!
//! Pure functions over the JSON policy document; nothing here talks to AWS.

use ab_common::IDENTIFIER_URI_SCHEME;
use serde_json::{json, Value};

use crate::FederationError;

pub const WEB_IDENTITY_ACTION: &str = "sts:AssumeRoleWithWebIdentity";

/// `arn:aws:iam::<account>:oidc-provider/<oidc_url>`
pub fn oidc_provider_arn(account: &str, oidc_url: &str) -> String {
    format!("arn:aws:iam::{}:oidc-provider/{}", account, oidc_url)
}

/// `arn:aws:iam::<account>:role/<role_name>`
pub fn cross_account_role_arn(account: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{}:role/{}", account, role_name)
}

/// `api://<audience>`, leaving an already prefixed value alone.
pub fn audience_uri(audience: &str) -> String {
    if audience.starts_with(IDENTIFIER_URI_SCHEME) {
        audience.to_string()
    } else {
        format!("{}{}", IDENTIFIER_URI_SCHEME, audience)
    }
}

fn action_matches(action: Option<&Value>) -> bool {
    match action {
        Some(Value::String(action)) => action == WEB_IDENTITY_ACTION,
        Some(Value::Array(actions)) => actions.iter().any(|a| a == WEB_IDENTITY_ACTION),
        _ => false,
    }
}

fn federated_matches(statement: &Value, provider_arn: &str) -> bool {
    statement
        .pointer("/Principal/Federated")
        .and_then(Value::as_str)
        .is_some_and(|federated| federated == provider_arn)
}

/// Set the `<oidc_url>:aud` condition of every web-identity statement trusting
/// the account's OIDC provider to `[audience_uri]`.
///
/// Only statements that already carry the `:aud` key under `StringEquals` are
/// touched. Returns the number of statements updated; zero is an error.
pub fn assign_audience(
    policy: &mut Value,
    account: &str,
    oidc_url: &str,
    audience_uri: &str,
) -> Result<usize, FederationError> {
    let provider_arn = oidc_provider_arn(account, oidc_url);
    let audience_key = format!("{}:aud", oidc_url);

    let statements: Vec<&mut Value> = match policy.get_mut("Statement") {
        Some(Value::Array(statements)) => statements.iter_mut().collect(),
        Some(statement @ Value::Object(_)) => vec![statement],
        _ => {
            return Err(FederationError::MalformedPolicy(
                "policy has no Statement".to_string(),
            ))
        }
    };

    let mut updated = 0;
    for statement in statements {
        if !federated_matches(statement, &provider_arn) || !action_matches(statement.get("Action")) {
            continue;
        }
        let Some(string_equals) = statement
            .pointer_mut("/Condition/StringEquals")
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        if let Some(value) = string_equals.get_mut(&audience_key) {
            *value = json!([audience_uri]);
            updated += 1;
        }
    }

    if updated == 0 {
        return Err(FederationError::TrustStatementNotFound {
            provider_arn,
            audience_key,
        });
    }
    Ok(updated)
}

/// Parse a trust policy as IAM returns it (URL-encoded JSON).
pub fn decode_policy_document(document: &str) -> Result<Value, FederationError> {
    let decoded = urlencoding::decode(document)
        .map_err(|e| FederationError::MalformedPolicy(format!("invalid URL encoding: {}", e)))?;
    serde_json::from_str(&decoded)
        .map_err(|e| FederationError::MalformedPolicy(format!("invalid JSON: {}", e)))
}
