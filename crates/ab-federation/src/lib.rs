//! Audience Broker Federation
//!
//! Target-account side of the audience lifecycle:
//! - [`AudienceAssigner`]: sets `api://<audience>` as the `<oidc_url>:aud`
//!   condition of the new role's web-identity trust statement
//! - [`AudienceRemover`]: removes `api://<audience>` from the account's OIDC
//!   identity provider
//!
//! Both assume a broker role in the target account first.

mod assign;
mod aws;
mod error;
mod policy;
mod remove;
mod request;

pub use assign::{AssignAudienceOutput, AudienceAssigner, ASSIGN_SESSION_NAME};
pub use aws::{AccountAccess, AccountIam, StsAccountAccess};
pub use error::FederationError;
pub use policy::{
    assign_audience, audience_uri, cross_account_role_arn, decode_policy_document,
    oidc_provider_arn, WEB_IDENTITY_ACTION,
};
pub use remove::{AudienceRemover, RemoveAudienceOutput, REMOVE_SESSION_NAME};
pub use request::{AudienceRequest, SfnParam};
