//! Step Functions execution starting.

use async_trait::async_trait;
use aws_sdk_sfn::error::DisplayErrorContext;
use aws_sdk_sfn::Client;
use tracing::{debug, info};

use crate::DispatchError;

/// Starts a state machine execution with a JSON input, returning the
/// execution ARN.
#[async_trait]
pub trait ExecutionStarter: Send + Sync {
    async fn start(&self, state_machine_arn: &str, input: &str) -> Result<String, DispatchError>;
}

/// [`ExecutionStarter`] over `aws-sdk-sfn`.
pub struct SfnExecutionStarter {
    client: Client,
}

impl SfnExecutionStarter {
    /// Client from the default AWS configuration chain, optionally pinned to `region`.
    pub async fn new(region: Option<String>) -> Self {
        let config = if let Some(region) = region {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region))
                .load()
                .await
        } else {
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
        };

        info!("Initialized Step Functions client");
        Self::from_client(Client::new(&config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExecutionStarter for SfnExecutionStarter {
    async fn start(&self, state_machine_arn: &str, input: &str) -> Result<String, DispatchError> {
        debug!(state_machine_arn, "Starting state machine execution");

        let output = self
            .client
            .start_execution()
            .state_machine_arn(state_machine_arn)
            .input(input)
            .send()
            .await
            .map_err(|e| DispatchError::StartFailed {
                state_machine_arn: state_machine_arn.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.execution_arn().to_string())
    }
}
