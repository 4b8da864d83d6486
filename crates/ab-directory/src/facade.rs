//! Directory Client Facade
//!
//! The small set of directory operations the create and delete pipelines
//! are composed of. Every lookup classifies its result as none, one or
//! several matches; several matches are never resolved by picking one.

use ab_common::StepOutcome;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    Application, Cardinality, CreateStep, CreatedApplication, DeletedApplication, DirectoryError,
    DirectoryResult, EntityKind, GraphApi, ServicePrincipal,
};

/// Maximum number of display-name matches fetched per search.
pub const SEARCH_RESULT_CAP: usize = 25;

/// Authenticated directory session.
#[derive(Clone)]
pub struct DirectoryClient {
    graph: Arc<dyn GraphApi>,
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient").finish_non_exhaustive()
    }
}

impl DirectoryClient {
    pub fn new(graph: Arc<dyn GraphApi>) -> Self {
        Self { graph }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// All applications matching `name` (up to [`SEARCH_RESULT_CAP`]).
    ///
    /// Graph's `$search` is tokenized, so matches are not guaranteed to be
    /// exact; the raw result is returned so callers see the real count.
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> DirectoryResult<Vec<Application>> {
        let matches = self
            .graph
            .search_applications_by_display_name(name, SEARCH_RESULT_CAP)
            .await?;
        debug!(count = matches.len(), "Searched applications by display name");
        Ok(matches)
    }

    /// Whether an application named `name` exists.
    ///
    /// Several matches count as existing. A single match without an app id
    /// is reported as `MissingField`.
    pub async fn exists(&self, name: &str) -> DirectoryResult<bool> {
        match Cardinality::of(self.find_by_name(name).await?) {
            Cardinality::None => Ok(false),
            Cardinality::One(application) => {
                application.require_app_id()?;
                Ok(true)
            }
            Cardinality::Many(count) => {
                warn!(name, count, "Multiple applications share this display name");
                Ok(true)
            }
        }
    }

    /// App id of the unique application named `name`.
    pub async fn get_app_id(&self, name: &str) -> DirectoryResult<String> {
        let application = Cardinality::of(self.find_by_name(name).await?)
            .into_single(EntityKind::Application, name)?;
        Ok(application.require_app_id()?.to_string())
    }

    /// The unique application whose app id is `app_id`.
    async fn application_by_app_id(&self, app_id: &str) -> DirectoryResult<Application> {
        Cardinality::of(self.graph.list_applications_by_app_id(app_id).await?)
            .into_single(EntityKind::Application, app_id)
    }

    /// The unique service principal of `app_id`.
    #[instrument(skip(self))]
    pub async fn get_service_principal_by_app_id(
        &self,
        app_id: &str,
    ) -> DirectoryResult<ServicePrincipal> {
        Cardinality::of(self.graph.list_service_principals_by_app_id(app_id).await?)
            .into_single(EntityKind::ServicePrincipal, app_id)
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Register a new application. Does not check for an existing one.
    #[instrument(skip(self))]
    pub async fn create_application(&self, name: &str) -> DirectoryResult<Application> {
        let application = self.graph.create_application(name).await?;
        application.require_app_id()?;
        info!(app_id = ?application.app_id, "Application created");
        Ok(application)
    }

    #[instrument(skip(self))]
    pub async fn create_service_principal(&self, app_id: &str) -> DirectoryResult<ServicePrincipal> {
        let principal = self.graph.create_service_principal(app_id).await?;
        principal.require_object_id()?;
        info!(service_principal_id = ?principal.id, "Service principal created");
        Ok(principal)
    }

    /// Create an application and its service principal.
    ///
    /// On failure the error says which half failed; when the principal
    /// fails the application already exists and its app id is carried in
    /// the error. Nothing is rolled back.
    pub async fn create_application_with_principal(
        &self,
        name: &str,
    ) -> DirectoryResult<CreatedApplication> {
        let app_id = match self.create_application(name).await {
            Ok(application) => application.require_app_id()?.to_string(),
            Err(source) => {
                return Err(DirectoryError::CreateFailed {
                    step: CreateStep::Application,
                    app_id: None,
                    source: Box::new(source),
                })
            }
        };

        let principal = match self.create_service_principal(&app_id).await {
            Ok(principal) => principal,
            Err(source) => {
                warn!(app_id = %app_id, error = %source, "Application created without service principal");
                return Err(DirectoryError::CreateFailed {
                    step: CreateStep::ServicePrincipal,
                    app_id: Some(app_id),
                    source: Box::new(source),
                });
            }
        };

        Ok(CreatedApplication {
            service_principal_id: principal.require_object_id()?.to_string(),
            app_id,
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replace the identifier URI list of the application `app_id` with `[uri]`.
    #[instrument(skip(self))]
    pub async fn set_identifier_uri(&self, app_id: &str, uri: &str) -> DirectoryResult<()> {
        let application = self.application_by_app_id(app_id).await?;
        let object_id = application.require_object_id()?;
        self.graph
            .update_identifier_uris(object_id, &[uri.to_string()])
            .await?;
        info!("Identifier URI set");
        Ok(())
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn delete_service_principal_by_app_id(&self, app_id: &str) -> DirectoryResult<()> {
        let principal = self.get_service_principal_by_app_id(app_id).await?;
        let object_id = principal.require_object_id()?;
        self.graph.delete_service_principal(object_id).await?;
        info!(service_principal_id = %object_id, "Service principal deleted");
        Ok(())
    }

    /// Delete the application `app_id` (its principal is left alone).
    #[instrument(skip(self))]
    pub async fn delete_application_by_app_id(&self, app_id: &str) -> DirectoryResult<()> {
        self.graph.delete_application_by_app_id(app_id).await?;
        info!("Application deleted");
        Ok(())
    }

    /// Delete the unique application named `name`, returning its app id.
    pub async fn delete_application(&self, name: &str) -> DirectoryResult<String> {
        let app_id = self.get_app_id(name).await?;
        self.delete_application_by_app_id(&app_id).await?;
        Ok(app_id)
    }

    /// Delete the unique application named `name` and, best-effort, its
    /// service principal.
    pub async fn delete_application_with_principal(
        &self,
        name: &str,
    ) -> DirectoryResult<DeletedApplication> {
        let app_id = self.get_app_id(name).await?;
        self.delete_resolved_application_with_principal(&app_id).await
    }

    /// Delete the application `app_id` and, best-effort, its service principal.
    ///
    /// A failed principal deletion is recorded as a degraded step and does
    /// not stop the application deletion.
    pub async fn delete_resolved_application_with_principal(
        &self,
        app_id: &str,
    ) -> DirectoryResult<DeletedApplication> {
        let service_principal =
            StepOutcome::from_result(self.delete_service_principal_by_app_id(app_id).await);
        if let Some(reason) = service_principal.reason() {
            warn!(app_id, reason, "Service principal not deleted, continuing with application");
        }

        self.delete_application_by_app_id(app_id)
            .await
            .map_err(|source| DirectoryError::DeleteFailed {
                app_id: app_id.to_string(),
                source: Box::new(source),
            })?;

        Ok(DeletedApplication {
            app_id: app_id.to_string(),
            service_principal,
        })
    }
}
