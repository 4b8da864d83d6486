//! Audience Broker: Assign Audience Lambda
//!
//! Invoked by the create-role state machine after the audience exists, with
//! `{sfnParam: {account, roleName}, audience}`. Assumes the broker role in the
//! target account and sets the role's `<OIDC_URL>:aud` trust condition to
//! `api://<audience>`.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OIDC_URL` | - | OIDC issuer as registered in IAM (required) |
//! | `CROSS_ACCOUNT_ROLE_NAME` | - | Role assumed in the target account (required) |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `RUST_LOG` | `info` | Log level |

use ab_federation::{AudienceAssigner, StsAccountAccess};
use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    ab_common::logging::init_lambda_logging("ab-assign-audience");

    let config = ab_config::AppConfig::load()?;
    config.validate_federation()?;

    let access = Arc::new(StsAccountAccess::new(None).await);
    let assigner = Arc::new(AudienceAssigner::new(config.federation, access));

    info!("Starting assign audience lambda");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let assigner = Arc::clone(&assigner);
        async move {
            let output = assigner.handle(event.payload).await.map_err(|e| {
                error!(error = %e, "Audience assignment failed");
                e
            })?;
            Ok::<_, lambda_runtime::Error>(output)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
