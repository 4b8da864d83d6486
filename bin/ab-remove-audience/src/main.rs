//! Audience Broker: Remove Audience Lambda
//!
//! Invoked by the delete-role state machine with `{sfnParam: {account}, audience}`.
//! Removes `api://<audience>` from the client id list of the target account's
//! OIDC provider for `OIDC_URL`.
//!
//! Uses the same environment variables as `ab-assign-audience`.

use ab_federation::{AudienceRemover, StsAccountAccess};
use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    ab_common::logging::init_lambda_logging("ab-remove-audience");

    let config = ab_config::AppConfig::load()?;
    config.validate_federation()?;

    let access = Arc::new(StsAccountAccess::new(None).await);
    let remover = Arc::new(AudienceRemover::new(config.federation, access));

    info!("Starting remove audience lambda");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let remover = Arc::clone(&remover);
        async move {
            let output = remover.handle(event.payload).await.map_err(|e| {
                error!(error = %e, "Audience removal failed");
                e
            })?;
            Ok::<_, lambda_runtime::Error>(output)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
