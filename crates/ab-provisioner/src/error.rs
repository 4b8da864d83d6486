//! Pipeline errors and their mapping to invocation status codes.

use ab_common::{STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR};
use ab_directory::DirectoryError;
use ab_secrets::SecretsError;
use thiserror::Error;

use crate::PipelineState;

pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors that end a create or delete invocation.
///
/// - `MalformedEvent` -> 400
/// - everything else -> 500
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Client secret could not be resolved, or a required setting is absent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invocation payload is not a valid role event.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The pipeline finished without an audience identifier.
    #[error("Pipeline produced an empty audience")]
    EmptyAudience,

    #[error("Invalid pipeline transition from {from} to {to}")]
    InvalidTransition { from: PipelineState, to: PipelineState },
}

impl From<SecretsError> for ProvisionError {
    fn from(err: SecretsError) -> Self {
        ProvisionError::Config(format!("Client secret unavailable: {}", err))
    }
}

impl ProvisionError {
    /// Stable error code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::MalformedEvent(_) => "MALFORMED_EVENT",
            Self::Directory(err) => match err {
                DirectoryError::Auth(_) => "AUTH",
                DirectoryError::NotFound { .. } => "NOT_FOUND",
                DirectoryError::Ambiguous { .. } => "AMBIGUOUS",
                DirectoryError::MissingField { .. } => "MISSING_FIELD",
                DirectoryError::CreateFailed { .. } => "CREATE_FAILED",
                DirectoryError::DeleteFailed { .. } => "DELETE_FAILED",
                DirectoryError::Config(_) => "CONFIG",
                _ => "DIRECTORY",
            },
            Self::EmptyAudience => "EMPTY_AUDIENCE",
            Self::InvalidTransition { .. } => "INTERNAL",
        }
    }

    /// Status code returned to the caller for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MalformedEvent(_) => STATUS_BAD_REQUEST,
            _ => STATUS_INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_directory::EntityKind;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProvisionError::MalformedEvent("x".into()).http_status_code(), 400);
        assert_eq!(ProvisionError::Config("x".into()).http_status_code(), 500);
        assert_eq!(ProvisionError::EmptyAudience.http_status_code(), 500);

        let err: ProvisionError = DirectoryError::NotFound {
            entity: EntityKind::Application,
            key: "aws-1-r".into(),
        }
        .into();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_secret_error_becomes_config() {
        let err: ProvisionError = SecretsError::NotFound("/azure/secret".into()).into();
        assert_eq!(err.code(), "CONFIG");
        assert_eq!(
            err.to_string(),
            "Configuration error: Client secret unavailable: Secret not found: /azure/secret"
        );
    }
}
