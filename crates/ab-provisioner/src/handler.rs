//! Invocation handlers for the create and delete lambdas.
//!
//! Order per invocation: client secret, then event, then pipeline. A secret
//! failure is reported before any directory call is made.

use ab_common::{CreateAudienceResponse, DeleteAudienceResponse, RoleEvent};
use ab_config::AppConfig;
use ab_directory::{Credentials, DirectoryConnector};
use ab_secrets::SharedProvider;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument, Span};

use crate::{CreateAudienceUseCase, DeleteAudienceUseCase, ProvisionError, ProvisionResult};

/// Shared state of a create or delete lambda.
pub struct AudienceHandler {
    config: AppConfig,
    secrets: Arc<SharedProvider>,
    connector: Arc<dyn DirectoryConnector>,
}

impl AudienceHandler {
    pub fn new(
        config: AppConfig,
        secrets: Arc<SharedProvider>,
        connector: Arc<dyn DirectoryConnector>,
    ) -> Self {
        Self {
            config,
            secrets,
            connector,
        }
    }

    pub async fn handle_create(&self, payload: Value) -> CreateAudienceResponse {
        match self.create(payload).await {
            Ok(audience) => CreateAudienceResponse::success(audience),
            Err(err) => {
                error!(code = err.code(), error = %err, "Create audience failed");
                CreateAudienceResponse::failure(err.http_status_code())
            }
        }
    }

    pub async fn handle_delete(&self, payload: Value) -> DeleteAudienceResponse {
        match self.delete(payload).await {
            Ok(app_id) => DeleteAudienceResponse::success(app_id),
            Err(err) => {
                error!(code = err.code(), error = %err, "Delete audience failed");
                DeleteAudienceResponse::failure(err.http_status_code())
            }
        }
    }

    async fn create(&self, payload: Value) -> ProvisionResult<String> {
        let credentials = self.credentials().await?;
        let event = parse_event(payload)?;
        let span = pipeline_span("create", &event);
        let created = async {
            info!("Creating audience");
            CreateAudienceUseCase::new(Arc::clone(&self.connector))
                .execute(credentials, &event)
                .await
        }
        .instrument(span)
        .await?;
        Ok(created.audience)
    }

    async fn delete(&self, payload: Value) -> ProvisionResult<String> {
        let credentials = self.credentials().await?;
        let event = parse_event(payload)?;
        let span = pipeline_span("delete", &event);
        let deleted = async {
            info!("Deleting audience");
            DeleteAudienceUseCase::new(Arc::clone(&self.connector))
                .execute(credentials, &event)
                .await
        }
        .instrument(span)
        .await?;
        Ok(deleted.app_id)
    }

    async fn credentials(&self) -> ProvisionResult<Credentials> {
        let parameter = &self.config.secrets.client_secret_parameter;
        if parameter.trim().is_empty() {
            return Err(ProvisionError::Config(
                "CLIENT_SECRET_SSM is not set".to_string(),
            ));
        }

        let secret = self.secrets.resolve(parameter).await?;
        Ok(Credentials::new(
            &self.config.azure.tenant_id,
            &self.config.azure.client_id,
            secret,
        ))
    }
}

fn pipeline_span(operation: &'static str, event: &RoleEvent) -> Span {
    info_span!(
        "audience_pipeline",
        operation,
        account = %event.account,
        role_name = %event.role_name,
        app_name = %event.app_name(),
    )
}

fn parse_event(payload: Value) -> ProvisionResult<RoleEvent> {
    let event =
        RoleEvent::from_value(payload).map_err(|e| ProvisionError::MalformedEvent(e.to_string()))?;
    if event.account.trim().is_empty() || event.role_name.trim().is_empty() {
        return Err(ProvisionError::MalformedEvent(
            "account and roleName must be non-empty".to_string(),
        ));
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event() {
        let event = parse_event(json!({
            "account": "111122223333",
            "eventName": "CreateRole",
            "roleName": "deploy"
        }))
        .unwrap();
        assert_eq!(event.app_name(), "aws-111122223333-deploy");
    }

    #[test]
    fn test_parse_event_rejects_missing_or_empty_fields() {
        assert!(matches!(
            parse_event(json!({ "account": "1" })),
            Err(ProvisionError::MalformedEvent(_))
        ));
        assert!(matches!(
            parse_event(json!({ "account": "", "roleName": "r" })),
            Err(ProvisionError::MalformedEvent(_))
        ));
        assert!(matches!(
            parse_event(json!("not an object")),
            Err(ProvisionError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_pipeline_span_fields() {
        let event = parse_event(json!({ "account": "111122223333", "roleName": "deploy" })).unwrap();

        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = pipeline_span("create", &event);
            let metadata = span.metadata().unwrap();
            assert_eq!(metadata.name(), "audience_pipeline");
            for field in ["operation", "account", "role_name", "app_name"] {
                assert!(metadata.fields().field(field).is_some(), "missing span field {}", field);
            }
        });
    }
}
