use thiserror::Error;

#[derive(Error, Debug)]
pub enum FederationError {
    #[error("Missing required parameters: {0}")]
    MissingParameters(String),

    #[error("OIDC trust relationship statement not found for {provider_arn} ({audience_key})")]
    TrustStatementNotFound {
        provider_arn: String,
        audience_key: String,
    },

    #[error("Malformed trust policy: {0}")]
    MalformedPolicy(String),

    #[error("Failed to assume {role_arn}: {message}")]
    AssumeRole { role_arn: String, message: String },

    #[error("IAM {action} failed: {message}")]
    Iam { action: String, message: String },
}
