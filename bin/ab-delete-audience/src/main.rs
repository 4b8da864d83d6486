//! Audience Broker: Delete Audience Lambda
//!
//! Invoked by the delete-role state machine with `{account, eventName, roleName}`.
//! Deletes the service principal (best-effort) and the application
//! `aws-<account>-<roleName>`, and returns the deleted `appId`.
//!
//! Uses the same environment variables as `ab-create-audience`.

use ab_directory::GraphConnector;
use ab_provisioner::AudienceHandler;
use ab_secrets::SharedProvider;
use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    ab_common::logging::init_lambda_logging("ab-delete-audience");

    let config = ab_config::AppConfig::load()?;
    config.validate_directory()?;

    let secrets = Arc::new(SharedProvider::new(config.secrets.clone()));
    let connector = Arc::new(GraphConnector::new(&config.azure)?);
    let handler = Arc::new(AudienceHandler::new(config, Arc::clone(&secrets), connector));

    info!("Starting delete audience lambda");

    let result = lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, lambda_runtime::Error>(handler.handle_delete(event.payload).await) }
    }))
    .await;

    SharedProvider::release(secrets);
    info!("Delete audience lambda stopped");
    result.map_err(|e| anyhow::anyhow!(e))
}
