//! Directory objects and the cardinality classification of lookups.

use ab_common::StepOutcome;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{DirectoryError, DirectoryResult, EntityKind};

/// Client credentials of the provisioning app registration.
///
/// Lives for one invocation; the secret never appears in `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }
}

/// Application registration as returned by Graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Object id
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub identifier_uris: Vec<String>,
}

impl Application {
    /// The app id, or `MissingField` when Graph returned none.
    pub fn require_app_id(&self) -> DirectoryResult<&str> {
        self.app_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(DirectoryError::MissingField {
                entity: EntityKind::Application,
                field: "appId",
            })
    }

    /// The object id, or `MissingField` when Graph returned none.
    pub fn require_object_id(&self) -> DirectoryResult<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(DirectoryError::MissingField {
                entity: EntityKind::Application,
                field: "id",
            })
    }
}

/// Service principal as returned by Graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ServicePrincipal {
    pub fn require_object_id(&self) -> DirectoryResult<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(DirectoryError::MissingField {
                entity: EntityKind::ServicePrincipal,
                field: "id",
            })
    }
}

/// Identifiers of a freshly created application and its service principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedApplication {
    pub app_id: String,
    pub service_principal_id: String,
}

/// Result of deleting an application together with its service principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedApplication {
    pub app_id: String,
    /// Principal removal is best-effort and never fails the deletion.
    pub service_principal: StepOutcome,
}

/// How many objects a lookup matched.
///
/// Name and app-id lookups are never assumed unique: every caller decides
/// explicitly what none, one and several matches mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality<T> {
    None,
    One(T),
    Many(usize),
}

impl<T> Cardinality<T> {
    pub fn of(mut items: Vec<T>) -> Self {
        match items.len() {
            0 => Cardinality::None,
            1 => match items.pop() {
                Some(item) => Cardinality::One(item),
                None => Cardinality::None,
            },
            n => Cardinality::Many(n),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Cardinality::None => 0,
            Cardinality::One(_) => 1,
            Cardinality::Many(n) => *n,
        }
    }

    /// The single match, or `NotFound` / `Ambiguous`.
    pub fn into_single(self, entity: EntityKind, key: &str) -> DirectoryResult<T> {
        match self {
            Cardinality::One(item) => Ok(item),
            Cardinality::None => Err(DirectoryError::NotFound {
                entity,
                key: key.to_string(),
            }),
            Cardinality::Many(count) => Err(DirectoryError::Ambiguous {
                entity,
                key: key.to_string(),
                count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_cardinality_classification() {
        assert_eq!(Cardinality::<u8>::of(vec![]), Cardinality::None);
        assert_eq!(Cardinality::of(vec![7u8]), Cardinality::One(7));
        assert_eq!(Cardinality::of(vec![1u8, 2, 3]), Cardinality::Many(3));
        assert_eq!(Cardinality::of(vec![1u8, 2]).count(), 2);
    }

    #[test]
    fn test_into_single_errors() {
        let none: Cardinality<u8> = Cardinality::None;
        assert!(matches!(
            none.into_single(EntityKind::Application, "k"),
            Err(DirectoryError::NotFound { .. })
        ));

        let many: Cardinality<u8> = Cardinality::Many(4);
        assert!(matches!(
            many.into_single(EntityKind::ServicePrincipal, "k"),
            Err(DirectoryError::Ambiguous { count: 4, entity: EntityKind::ServicePrincipal, .. })
        ));
    }

    #[test]
    fn test_application_parsing_from_graph() {
        let json = r#"{
            "id": "obj-1",
            "appId": "app-1",
            "displayName": "aws-111122223333-deploy",
            "identifierUris": ["api://app-1"]
        }"#;
        let app: Application = serde_json::from_str(json).unwrap();
        assert_eq!(app.require_app_id().unwrap(), "app-1");
        assert_eq!(app.require_object_id().unwrap(), "obj-1");
        assert_eq!(app.identifier_uris, vec!["api://app-1".to_string()]);
    }

    #[test]
    fn test_missing_app_id() {
        let app: Application = serde_json::from_str(r#"{"displayName": "x"}"#).unwrap();
        assert!(matches!(
            app.require_app_id(),
            Err(DirectoryError::MissingField { field: "appId", .. })
        ));
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = Credentials::new("tenant", "client", "super-secret-value");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret-value"));
        assert_eq!(creds.client_secret.expose_secret(), "super-secret-value");
    }
}
