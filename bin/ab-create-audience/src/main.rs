//! Audience Broker: Create Audience Lambda
//!
//! Invoked by the create-role state machine with `{account, eventName, roleName}`.
//! Ensures the application `aws-<account>-<roleName>` exists in Azure AD with a
//! service principal and `api://<appId>` identifier URI, and returns the app id
//! as `audience`.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TENANT_ID` | - | Azure AD tenant (required) |
//! | `CLIENT_ID` | - | Client id of the provisioning app (required) |
//! | `CLIENT_SECRET_SSM` | - | SSM parameter holding the client secret (required) |
//! | `AZURE_CLOUD` | `public` | `public`, `government` or `china` |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `RUST_LOG` | `info` | Log level |

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
    ab_common::logging::init_lambda_logging("ab-create-audience");

    let config = ab_config::AppConfig::load()?;
    config.validate_directory()?;

    let secrets = Arc::new(SharedProvider::new(config.secrets.clone()));
    let connector = Arc::new(GraphConnector::new(&config.azure)?);
    let handler = Arc::new(AudienceHandler::new(config, Arc::clone(&secrets), connector));

    info!("Starting create audience lambda");

    let result = lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, lambda_runtime::Error>(handler.handle_create(event.payload).await) }
    }))
    .await;

    SharedProvider::release(secrets);
    info!("Create audience lambda stopped");
    result.map_err(|e| anyhow::anyhow!(e))
}
