//! Audience Broker Dispatch
//!
//! Turns IAM `CreateRole` / `DeleteRole` CloudTrail events into Step
//! Functions executions carrying the `{account, eventName, roleName}` payload
//! the create and delete lambdas consume.

use thiserror::Error;

mod envelope;
mod router;
mod starter;

pub use envelope::{CloudTrailDetail, CloudTrailEnvelope, RequestParameters};
pub use router::{DispatchOutcome, EventRouter, Route, CREATE_ROLE_EVENT, DELETE_ROLE_EVENT};
pub use starter::{ExecutionStarter, SfnExecutionStarter};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Malformed event: {0}")]
    MalformedEnvelope(String),

    #[error("Missing Step Function ARN for event: {0}")]
    MissingStateMachine(String),

    #[error("Failed to start execution of {state_machine_arn}: {message}")]
    StartFailed {
        state_machine_arn: String,
        message: String,
    },
}
