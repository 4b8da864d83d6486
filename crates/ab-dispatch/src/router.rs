//! Routes IAM role lifecycle events to the create / delete state machines.

use ab_common::RoleEvent;
use ab_config::DispatchConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{CloudTrailEnvelope, DispatchError, ExecutionStarter};

pub const CREATE_ROLE_EVENT: &str = "CreateRole";
pub const DELETE_ROLE_EVENT: &str = "DeleteRole";

/// What the router did with an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Started {
        #[serde(rename = "executionArn")]
        execution_arn: String,
    },
    Ignored {
        #[serde(rename = "eventName")]
        event_name: Option<String>,
    },
}

/// State machine an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Create,
    Delete,
}

impl Route {
    pub fn for_event(event_name: &str) -> Option<Self> {
        match event_name {
            CREATE_ROLE_EVENT => Some(Route::Create),
            DELETE_ROLE_EVENT => Some(Route::Delete),
            _ => None,
        }
    }
}

pub struct EventRouter {
    config: DispatchConfig,
    starter: Arc<dyn ExecutionStarter>,
}

impl EventRouter {
    pub fn new(config: DispatchConfig, starter: Arc<dyn ExecutionStarter>) -> Self {
        Self { config, starter }
    }

    fn state_machine_arn(&self, route: Route) -> Option<&str> {
        let arn = match route {
            Route::Create => &self.config.create_state_machine_arn,
            Route::Delete => &self.config.delete_state_machine_arn,
        };
        Some(arn.as_str()).filter(|a| !a.trim().is_empty())
    }

    #[instrument(skip_all)]
    pub async fn route(&self, payload: Value) -> Result<DispatchOutcome, DispatchError> {
        let envelope: CloudTrailEnvelope = serde_json::from_value(payload)
            .map_err(|e| DispatchError::MalformedEnvelope(e.to_string()))?;

        info!(
            account = envelope.account.as_deref().unwrap_or_default(),
            event_name = envelope.event_name().unwrap_or_default(),
            role_name = envelope.role_name().unwrap_or_default(),
            "Received IAM role event"
        );

        let Some(route) = envelope.event_name().and_then(Route::for_event) else {
            info!(event_name = ?envelope.event_name(), "Ignoring unsupported event");
            return Ok(DispatchOutcome::Ignored {
                event_name: envelope.detail.event_name.clone(),
            });
        };

        let event_name = envelope.event_name().unwrap_or_default();
        let arn = self
            .state_machine_arn(route)
            .ok_or_else(|| DispatchError::MissingStateMachine(event_name.to_string()))?;

        let account = envelope
            .account
            .as_deref()
            .ok_or_else(|| DispatchError::MalformedEnvelope("account is missing".to_string()))?;
        let role_name = envelope.role_name().ok_or_else(|| {
            DispatchError::MalformedEnvelope("detail.requestParameters.roleName is missing".to_string())
        })?;

        let input = serde_json::to_string(&RoleEvent::new(account, event_name, role_name))
            .map_err(|e| DispatchError::MalformedEnvelope(e.to_string()))?;

        let execution_arn = self.starter.start(arn, &input).await?;
        info!(event_name, execution_arn = %execution_arn, "State machine execution started");

        Ok(DispatchOutcome::Started { execution_arn })
    }
}
