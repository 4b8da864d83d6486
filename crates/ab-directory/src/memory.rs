//! In-memory directory for tests and local runs.
//!
//! Behaves like the Graph endpoints the facade uses, including duplicate
//! display names, and can be told to fail individual operations.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use crate::{Application, DirectoryError, DirectoryResult, GraphApi, ServicePrincipal};

/// Graph operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphOperation {
    Search,
    ListApplications,
    CreateApplication,
    UpdateIdentifierUris,
    DeleteApplication,
    CreateServicePrincipal,
    ListServicePrincipals,
    DeleteServicePrincipal,
}

#[derive(Debug, Default)]
struct State {
    applications: Vec<Application>,
    service_principals: Vec<ServicePrincipal>,
    failing: HashSet<GraphOperation>,
    calls: Vec<GraphOperation>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }

    fn enter(&mut self, op: GraphOperation) -> DirectoryResult<()> {
        self.calls.push(op);
        if self.failing.contains(&op) {
            return Err(DirectoryError::GraphApi {
                status: 500,
                code: "InjectedFailure".to_string(),
                message: format!("{:?} failed", op),
            });
        }
        Ok(())
    }
}

fn not_found(what: &str) -> DirectoryError {
    DirectoryError::GraphApi {
        status: 404,
        code: "Request_ResourceNotFound".to_string(),
        message: format!("{} does not exist", what),
    }
}

/// Thread-safe in-memory [`GraphApi`].
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    state: Mutex<State>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an application directly, returning its app id.
    pub fn seed_application(&self, display_name: &str) -> String {
        let mut state = self.state.lock();
        let id = state.next_id("obj");
        let app_id = state.next_id("app");
        state.applications.push(Application {
            id: Some(id),
            app_id: Some(app_id.clone()),
            display_name: Some(display_name.to_string()),
            identifier_uris: Vec::new(),
        });
        app_id
    }

    /// Insert an application as-is, e.g. one lacking an app id.
    pub fn seed_raw_application(&self, application: Application) {
        self.state.lock().applications.push(application);
    }

    /// Insert a service principal for `app_id`, returning its object id.
    pub fn seed_service_principal(&self, app_id: &str) -> String {
        let mut state = self.state.lock();
        let id = state.next_id("sp");
        state.service_principals.push(ServicePrincipal {
            id: Some(id.clone()),
            app_id: Some(app_id.to_string()),
            display_name: None,
        });
        id
    }

    pub fn fail(&self, op: GraphOperation) {
        self.state.lock().failing.insert(op);
    }

    pub fn recover(&self, op: GraphOperation) {
        self.state.lock().failing.remove(&op);
    }

    pub fn applications(&self) -> Vec<Application> {
        self.state.lock().applications.clone()
    }

    pub fn service_principals(&self) -> Vec<ServicePrincipal> {
        self.state.lock().service_principals.clone()
    }

    /// Applications whose display name is exactly `display_name`.
    pub fn applications_named(&self, display_name: &str) -> Vec<Application> {
        self.state
            .lock()
            .applications
            .iter()
            .filter(|a| a.display_name.as_deref() == Some(display_name))
            .cloned()
            .collect()
    }

    /// Every operation attempted so far, in order.
    pub fn calls(&self) -> Vec<GraphOperation> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, op: GraphOperation) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == op).count()
    }
}

#[async_trait]
impl GraphApi for InMemoryGraph {
    async fn search_applications_by_display_name(
        &self,
        display_name: &str,
        top: usize,
    ) -> DirectoryResult<Vec<Application>> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::Search)?;
        let mut matches: Vec<Application> = state
            .applications
            .iter()
            .filter(|a| a.display_name.as_deref() == Some(display_name))
            .cloned()
            .collect();
        matches.truncate(top);
        Ok(matches)
    }

    async fn list_applications_by_app_id(&self, app_id: &str) -> DirectoryResult<Vec<Application>> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::ListApplications)?;
        Ok(state
            .applications
            .iter()
            .filter(|a| a.app_id.as_deref() == Some(app_id))
            .cloned()
            .collect())
    }

    async fn create_application(&self, display_name: &str) -> DirectoryResult<Application> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::CreateApplication)?;
        let application = Application {
            id: Some(state.next_id("obj")),
            app_id: Some(state.next_id("app")),
            display_name: Some(display_name.to_string()),
            identifier_uris: Vec::new(),
        };
        state.applications.push(application.clone());
        Ok(application)
    }

    async fn update_identifier_uris(&self, object_id: &str, uris: &[String]) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::UpdateIdentifierUris)?;
        let application = state
            .applications
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(object_id))
            .ok_or_else(|| not_found("application"))?;
        application.identifier_uris = uris.to_vec();
        Ok(())
    }

    async fn delete_application_by_app_id(&self, app_id: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::DeleteApplication)?;
        let position = state
            .applications
            .iter()
            .position(|a| a.app_id.as_deref() == Some(app_id))
            .ok_or_else(|| not_found("application"))?;
        state.applications.remove(position);
        Ok(())
    }

    async fn create_service_principal(&self, app_id: &str) -> DirectoryResult<ServicePrincipal> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::CreateServicePrincipal)?;
        if !state.applications.iter().any(|a| a.app_id.as_deref() == Some(app_id)) {
            return Err(not_found("application"));
        }
        let principal = ServicePrincipal {
            id: Some(state.next_id("sp")),
            app_id: Some(app_id.to_string()),
            display_name: None,
        };
        state.service_principals.push(principal.clone());
        Ok(principal)
    }

    async fn list_service_principals_by_app_id(
        &self,
        app_id: &str,
    ) -> DirectoryResult<Vec<ServicePrincipal>> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::ListServicePrincipals)?;
        Ok(state
            .service_principals
            .iter()
            .filter(|sp| sp.app_id.as_deref() == Some(app_id))
            .cloned()
            .collect())
    }

    async fn delete_service_principal(&self, object_id: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.enter(GraphOperation::DeleteServicePrincipal)?;
        let position = state
            .service_principals
            .iter()
            .position(|sp| sp.id.as_deref() == Some(object_id))
            .ok_or_else(|| not_found("service principal"))?;
        state.service_principals.remove(position);
        Ok(())
    }
}
