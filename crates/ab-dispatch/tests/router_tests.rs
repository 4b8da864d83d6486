use ab_config::DispatchConfig;
use ab_dispatch::{DispatchError, DispatchOutcome, EventRouter, ExecutionStarter};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

const CREATE_ARN: &str = "arn:aws:states:eu-west-1:999999999999:stateMachine:create-role";
const DELETE_ARN: &str = "arn:aws:states:eu-west-1:999999999999:stateMachine:delete-role";

#[derive(Default)]
struct RecordingStarter {
    started: Mutex<Vec<(String, Value)>>,
    fail: bool,
}

#[async_trait]
impl ExecutionStarter for RecordingStarter {
    async fn start(&self, state_machine_arn: &str, input: &str) -> Result<String, DispatchError> {
        if self.fail {
            return Err(DispatchError::StartFailed {
                state_machine_arn: state_machine_arn.to_string(),
                message: "ExecutionLimitExceeded".to_string(),
            });
        }
        let input: Value = serde_json::from_str(input).unwrap();
        let mut started = self.started.lock();
        started.push((state_machine_arn.to_string(), input));
        Ok(format!("{}:execution-{}", state_machine_arn, started.len()))
    }
}

fn config() -> DispatchConfig {
    DispatchConfig {
        create_state_machine_arn: CREATE_ARN.to_string(),
        delete_state_machine_arn: DELETE_ARN.to_string(),
    }
}

fn iam_event(event_name: &str) -> Value {
    json!({
        "account": "111122223333",
        "source": "aws.iam",
        "detail": {
            "eventName": event_name,
            "requestParameters": { "roleName": "deploy" }
        }
    })
}

#[tokio::test]
async fn test_create_role_starts_create_state_machine() {
    let starter = Arc::new(RecordingStarter::default());
    let router = EventRouter::new(config(), starter.clone());

    let outcome = router.route(iam_event("CreateRole")).await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Started {
            execution_arn: format!("{}:execution-1", CREATE_ARN)
        }
    );

    let started = starter.started.lock();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].0, CREATE_ARN);
    assert_eq!(
        started[0].1,
        json!({ "account": "111122223333", "eventName": "CreateRole", "roleName": "deploy" })
    );
}

#[tokio::test]
async fn test_delete_role_starts_delete_state_machine() {
    let starter = Arc::new(RecordingStarter::default());
    let router = EventRouter::new(config(), starter.clone());

    router.route(iam_event("DeleteRole")).await.unwrap();
    assert_eq!(starter.started.lock()[0].0, DELETE_ARN);
}

#[tokio::test]
async fn test_other_events_are_ignored() {
    let starter = Arc::new(RecordingStarter::default());
    let router = EventRouter::new(config(), starter.clone());

    let outcome = router.route(iam_event("AttachRolePolicy")).await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Ignored {
            event_name: Some("AttachRolePolicy".to_string())
        }
    );

    let outcome = router.route(json!({ "account": "1" })).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Ignored { event_name: None });
    assert!(starter.started.lock().is_empty());
}

#[tokio::test]
async fn test_missing_state_machine_arn() {
    let starter = Arc::new(RecordingStarter::default());
    let router = EventRouter::new(
        DispatchConfig {
            create_state_machine_arn: CREATE_ARN.to_string(),
            delete_state_machine_arn: String::new(),
        },
        starter.clone(),
    );

    let err = router.route(iam_event("DeleteRole")).await.unwrap_err();
    assert!(matches!(err, DispatchError::MissingStateMachine(ref e) if e == "DeleteRole"));
    assert!(starter.started.lock().is_empty());
}

#[tokio::test]
async fn test_routed_event_without_role_name_is_malformed() {
    let router = EventRouter::new(config(), Arc::new(RecordingStarter::default()));

    let err = router
        .route(json!({ "account": "111122223333", "detail": { "eventName": "CreateRole" } }))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::MalformedEnvelope(_)));
}

#[tokio::test]
async fn test_start_failure_propagates() {
    let starter = Arc::new(RecordingStarter {
        fail: true,
        ..Default::default()
    });
    let router = EventRouter::new(config(), starter);

    let err = router.route(iam_event("CreateRole")).await.unwrap_err();
    assert!(matches!(err, DispatchError::StartFailed { .. }));
}
