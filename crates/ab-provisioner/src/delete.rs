//! Delete Audience Use Case

use ab_common::RoleEvent;
use ab_directory::{Credentials, DeletedApplication, DirectoryConnector};
use std::sync::Arc;
use tracing::info;

use crate::{PipelineState, PipelineTracker, ProvisionResult};

/// Resolves the canonical application of an event and deletes it together
/// with its service principal (best-effort).
pub struct DeleteAudienceUseCase {
    connector: Arc<dyn DirectoryConnector>,
}

impl DeleteAudienceUseCase {
    pub fn new(connector: Arc<dyn DirectoryConnector>) -> Self {
        Self { connector }
    }

    pub async fn execute(
        &self,
        credentials: Credentials,
        event: &RoleEvent,
    ) -> ProvisionResult<DeletedApplication> {
        let mut tracker = PipelineTracker::new("delete");
        self.execute_tracked(credentials, event, &mut tracker).await
    }

    pub async fn execute_tracked(
        &self,
        credentials: Credentials,
        event: &RoleEvent,
        tracker: &mut PipelineTracker,
    ) -> ProvisionResult<DeletedApplication> {
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
    ) -> ProvisionResult<DeletedApplication> {
        tracker.advance(PipelineState::Authenticating)?;
        let client = self.connector.connect(credentials).await?;

        tracker.advance(PipelineState::Resolving)?;
        let app_name = event.app_name();
        let app_id = client.get_app_id(&app_name).await?;

        tracker.advance(PipelineState::Deleting)?;
        let deleted = client.delete_resolved_application_with_principal(&app_id).await?;
        info!(
            app_name = %app_name,
            app_id = %deleted.app_id,
            service_principal = %deleted.service_principal,
            "Application deleted"
        );

        tracker.advance(PipelineState::Done)?;
        Ok(deleted)
    }
}
