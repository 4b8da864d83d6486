//! Create Audience Use Case
//!
//! Authenticate, look the canonical application up, and either return the
//! existing app id or create application + service principal and point the
//! identifier URI at `api://<appId>`.

use ab_common::{identifier_uri, RoleEvent, StepOutcome};
use ab_directory::{Credentials, DirectoryConnector};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{PipelineState, PipelineTracker, ProvisionError, ProvisionResult};

/// Result of a create run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAudience {
    /// App id of the application, new or pre-existing.
    pub audience: String,
    /// False when the application already existed.
    pub created: bool,
    pub service_principal_id: Option<String>,
    /// Identifier URI configuration; `Ok` when nothing had to be configured.
    pub identifier_uri: StepOutcome,
}

pub struct CreateAudienceUseCase {
    connector: Arc<dyn DirectoryConnector>,
}

impl CreateAudienceUseCase {
    pub fn new(connector: Arc<dyn DirectoryConnector>) -> Self {
        Self { connector }
    }

    pub async fn execute(
        &self,
        credentials: Credentials,
        event: &RoleEvent,
    ) -> ProvisionResult<CreatedAudience> {
        let mut tracker = PipelineTracker::new("create");
        self.execute_tracked(credentials, event, &mut tracker).await
    }

    /// Same as [`execute`](Self::execute), recording states in `tracker`.
    pub async fn execute_tracked(
        &self,
        credentials: Credentials,
        event: &RoleEvent,
        tracker: &mut PipelineTracker,
    ) -> ProvisionResult<CreatedAudience> {
        let result = self.run(credentials, event, tracker).await;
        if let Err(err) = &result {
            tracker.fail(err.to_string());
        }
        result
    }

    async fn run(
        &self,
        credentials: Credentials,
        event: &RoleEvent,
        tracker: &mut PipelineTracker,
    ) -> ProvisionResult<CreatedAudience> {
        tracker.advance(PipelineState::Authenticating)?;
        let client = self.connector.connect(credentials).await?;

        tracker.advance(PipelineState::Resolving)?;
        let app_name = event.app_name();

        if client.exists(&app_name).await? {
            let audience = client.get_app_id(&app_name).await?;
            info!(app_name = %app_name, audience = %audience, "Application already exists");
            tracker.advance(PipelineState::Done)?;
            return finish(CreatedAudience {
                audience,
                created: false,
                service_principal_id: None,
                identifier_uri: StepOutcome::Ok,
            });
        }

        tracker.advance(PipelineState::Creating)?;
        let created = client.create_application_with_principal(&app_name).await?;
        info!(
            app_name = %app_name,
            app_id = %created.app_id,
            service_principal_id = %created.service_principal_id,
            "Application and service principal created"
        );

        tracker.advance(PipelineState::Mutating)?;
        let uri = identifier_uri(&created.app_id);
        let identifier_uri =
            StepOutcome::from_result(client.set_identifier_uri(&created.app_id, &uri).await);
        if let Some(reason) = identifier_uri.reason() {
            warn!(app_id = %created.app_id, uri = %uri, reason, "Identifier URI not set");
        }

        tracker.advance(PipelineState::Done)?;
        finish(CreatedAudience {
            audience: created.app_id,
            created: true,
            service_principal_id: Some(created.service_principal_id),
            identifier_uri,
        })
    }
}

fn finish(created: CreatedAudience) -> ProvisionResult<CreatedAudience> {
    if created.audience.trim().is_empty() {
        return Err(ProvisionError::EmptyAudience);
    }
    Ok(created)
}
