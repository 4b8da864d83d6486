//! Error types for the directory facade.

use std::fmt;
use thiserror::Error;

/// Result type alias using `DirectoryError`.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory object kinds, used to qualify lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Application,
    ServicePrincipal,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Application => write!(f, "application"),
            EntityKind::ServicePrincipal => write!(f, "service principal"),
        }
    }
}

/// Which half of an application + service principal creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStep {
    Application,
    ServicePrincipal,
}

impl fmt::Display for CreateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateStep::Application => write!(f, "application"),
            CreateStep::ServicePrincipal => write!(f, "service principal"),
        }
    }
}

/// Errors that can occur when talking to the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Client-credentials exchange failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A lookup matched nothing.
    #[error("No {entity} found for {key}")]
    NotFound { entity: EntityKind, key: String },

    /// A lookup that must be unique matched several objects.
    #[error("Multiple ({count}) {entity} entries found for {key}")]
    Ambiguous {
        entity: EntityKind,
        key: String,
        count: usize,
    },

    /// A matched object lacks a field the caller needs.
    #[error("{entity} is missing required field {field}")]
    MissingField {
        entity: EntityKind,
        field: &'static str,
    },

    /// Application or service principal creation failed. `app_id` is set when
    /// the application was created before the failure, so it can be cleaned up.
    #[error("Failed to create {step}: {source}")]
    CreateFailed {
        step: CreateStep,
        app_id: Option<String>,
        source: Box<DirectoryError>,
    },

    /// Application deletion failed after its app id was resolved.
    #[error("Failed to delete application {app_id}: {source}")]
    DeleteFailed {
        app_id: String,
        source: Box<DirectoryError>,
    },

    /// Microsoft Graph returned an error response.
    #[error("Graph API error: {status} {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DirectoryError {
    /// True for lookups that found nothing, including Graph 404 responses.
    pub fn is_not_found(&self) -> bool {
        match self {
            DirectoryError::NotFound { .. } => true,
            DirectoryError::GraphApi { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// App id of an application that exists despite the failure, if any.
    pub fn partial_app_id(&self) -> Option<&str> {
        match self {
            DirectoryError::CreateFailed { app_id, .. } => app_id.as_deref(),
            DirectoryError::DeleteFailed { app_id, .. } => Some(app_id),
            _ => None,
        }
    }
}
