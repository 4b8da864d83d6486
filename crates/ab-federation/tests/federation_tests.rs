//! Assign / remove handlers against a fake target account.

use ab_config::FederationConfig;
use ab_federation::{
    oidc_provider_arn, AccountAccess, AccountIam, AudienceAssigner, AudienceRemover,
    FederationError, ASSIGN_SESSION_NAME, REMOVE_SESSION_NAME,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const ACCOUNT: &str = "111122223333";
const OIDC_URL: &str = "sts.windows.net/tenant-1/";
const BROKER_ROLE: &str = "audience-broker";

#[derive(Default)]
struct FakeAccount {
    policies: Mutex<HashMap<String, Value>>,
    client_ids: Mutex<Vec<String>>,
    assumed: Mutex<Vec<(String, String)>>,
    deny_assume: bool,
}

struct FakeIam {
    account: Arc<FakeAccount>,
}

#[async_trait]
impl AccountIam for FakeIam {
    async fn get_trust_policy(&self, role_name: &str) -> Result<Value, FederationError> {
        self.account
            .policies
            .lock()
            .get(role_name)
            .cloned()
            .ok_or_else(|| FederationError::Iam {
                action: "GetRole".to_string(),
                message: "NoSuchEntity".to_string(),
            })
    }

    async fn update_trust_policy(&self, role_name: &str, policy: &Value) -> Result<(), FederationError> {
        self.account
            .policies
            .lock()
            .insert(role_name.to_string(), policy.clone());
        Ok(())
    }

    async fn remove_oidc_client_id(
        &self,
        provider_arn: &str,
        client_id: &str,
    ) -> Result<(), FederationError> {
        assert_eq!(provider_arn, oidc_provider_arn(ACCOUNT, OIDC_URL));
        self.account.client_ids.lock().retain(|c| c != client_id);
        Ok(())
    }
}

struct FakeAccess {
    account: Arc<FakeAccount>,
}

#[async_trait]
impl AccountAccess for FakeAccess {
    async fn assume(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<Box<dyn AccountIam>, FederationError> {
        if self.account.deny_assume {
            return Err(FederationError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: "AccessDenied".to_string(),
            });
        }
        self.account
            .assumed
            .lock()
            .push((role_arn.to_string(), session_name.to_string()));
        Ok(Box::new(FakeIam {
            account: Arc::clone(&self.account),
        }))
    }
}

fn config() -> FederationConfig {
    FederationConfig {
        oidc_url: OIDC_URL.to_string(),
        cross_account_role_name: BROKER_ROLE.to_string(),
    }
}

fn deploy_role_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Federated": oidc_provider_arn(ACCOUNT, OIDC_URL) },
            "Action": "sts:AssumeRoleWithWebIdentity",
            "Condition": { "StringEquals": { "sts.windows.net/tenant-1/:aud": "pending" } }
        }]
    })
}

fn payload() -> Value {
    json!({
        "sfnParam": { "account": ACCOUNT, "eventName": "CreateRole", "roleName": "deploy" },
        "audience": "app-1"
    })
}

#[tokio::test]
async fn test_assign_updates_trust_policy() {
    let account = Arc::new(FakeAccount::default());
    account.policies.lock().insert("deploy".to_string(), deploy_role_policy());
    let assigner = AudienceAssigner::new(config(), Arc::new(FakeAccess { account: account.clone() }));

    let output = assigner.handle(payload()).await.unwrap();
    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "status": "success",
            "roleName": "deploy",
            "account": ACCOUNT,
            "audience": "app-1"
        })
    );

    let policy = account.policies.lock().get("deploy").cloned().unwrap();
    assert_eq!(
        policy["Statement"][0]["Condition"]["StringEquals"]["sts.windows.net/tenant-1/:aud"],
        json!(["api://app-1"])
    );
    assert_eq!(
        account.assumed.lock()[0],
        (
            format!("arn:aws:iam::{}:role/{}", ACCOUNT, BROKER_ROLE),
            ASSIGN_SESSION_NAME.to_string()
        )
    );
}

#[tokio::test]
async fn test_assign_without_matching_statement_leaves_policy() {
    let account = Arc::new(FakeAccount::default());
    let ec2_only = json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "ec2.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    });
    account.policies.lock().insert("deploy".to_string(), ec2_only.clone());
    let assigner = AudienceAssigner::new(config(), Arc::new(FakeAccess { account: account.clone() }));

    let err = assigner.handle(payload()).await.unwrap_err();
    assert!(matches!(err, FederationError::TrustStatementNotFound { .. }));
    assert_eq!(account.policies.lock().get("deploy"), Some(&ec2_only));
}

#[tokio::test]
async fn test_assign_missing_parameters() {
    let account = Arc::new(FakeAccount::default());
    let assigner = AudienceAssigner::new(config(), Arc::new(FakeAccess { account: account.clone() }));

    let err = assigner
        .handle(json!({ "sfnParam": { "account": ACCOUNT } }))
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::MissingParameters(_)));
    assert!(account.assumed.lock().is_empty());

    let unconfigured = AudienceAssigner::new(
        FederationConfig::default(),
        Arc::new(FakeAccess { account: account.clone() }),
    );
    let err = unconfigured.handle(payload()).await.unwrap_err();
    assert!(matches!(err, FederationError::MissingParameters(ref name) if name == "OIDC_URL"));
}

#[tokio::test]
async fn test_assume_role_failure_propagates() {
    let account = Arc::new(FakeAccount {
        deny_assume: true,
        ..Default::default()
    });
    let assigner = AudienceAssigner::new(config(), Arc::new(FakeAccess { account }));

    let err = assigner.handle(payload()).await.unwrap_err();
    assert!(matches!(err, FederationError::AssumeRole { .. }));
}

#[tokio::test]
async fn test_remove_drops_client_id() {
    let account = Arc::new(FakeAccount::default());
    account
        .client_ids
        .lock()
        .extend(["sts.amazonaws.com".to_string(), "api://app-1".to_string()]);
    let remover = AudienceRemover::new(config(), Arc::new(FakeAccess { account: account.clone() }));

    let output = remover
        .handle(json!({ "sfnParam": { "account": ACCOUNT }, "audience": "app-1" }))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "status": "success",
            "account": ACCOUNT,
            "oidc_url": OIDC_URL,
            "audience": "api://app-1"
        })
    );
    assert_eq!(*account.client_ids.lock(), vec!["sts.amazonaws.com".to_string()]);
    assert_eq!(account.assumed.lock()[0].1, REMOVE_SESSION_NAME);
}
