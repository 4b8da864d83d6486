//! Raw Microsoft Graph operations used by the facade.

use async_trait::async_trait;

use crate::{Application, DirectoryResult, ServicePrincipal};

/// The Graph calls the facade is built on.
///
/// Implementations perform exactly one remote call per method and do no
/// interpretation of result counts; that is the facade's job.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// `GET /applications?$search="displayName:<name>"` (eventual consistency).
    async fn search_applications_by_display_name(
        &self,
        display_name: &str,
        top: usize,
    ) -> DirectoryResult<Vec<Application>>;

    /// `GET /applications?$filter=appId eq '<appId>'`
    async fn list_applications_by_app_id(&self, app_id: &str) -> DirectoryResult<Vec<Application>>;

    /// `POST /applications`
    async fn create_application(&self, display_name: &str) -> DirectoryResult<Application>;

    /// `PATCH /applications/<objectId>`, replacing the identifier URI list.
    async fn update_identifier_uris(&self, object_id: &str, uris: &[String]) -> DirectoryResult<()>;

    /// `DELETE /applications(appId='<appId>')`
    async fn delete_application_by_app_id(&self, app_id: &str) -> DirectoryResult<()>;

    /// `POST /servicePrincipals`
    async fn create_service_principal(&self, app_id: &str) -> DirectoryResult<ServicePrincipal>;

    /// `GET /servicePrincipals?$filter=appId eq '<appId>'`
    async fn list_service_principals_by_app_id(
        &self,
        app_id: &str,
    ) -> DirectoryResult<Vec<ServicePrincipal>>;

    /// `DELETE /servicePrincipals/<objectId>`
    async fn delete_service_principal(&self, object_id: &str) -> DirectoryResult<()>;
}
