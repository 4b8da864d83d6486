//! Audience Broker: Event Router Lambda
//!
//! Receives IAM CloudTrail events from EventBridge and starts the create or
//! delete state machine. Other events are acknowledged as `ignored`.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CREATE_ROLE_SFN_ARN` | - | State machine started for `CreateRole` |
//! | `DELETE_ROLE_SFN_ARN` | - | State machine started for `DeleteRole` |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `RUST_LOG` | `info` | Log level |

use ab_dispatch::{EventRouter, SfnExecutionStarter};
use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    ab_common::logging::init_lambda_logging("ab-event-router");

    let config = ab_config::AppConfig::load()?;
    if config.dispatch.create_state_machine_arn.is_empty()
        || config.dispatch.delete_state_machine_arn.is_empty()
    {
        warn!("A state machine ARN is not configured; matching events will fail");
    }

    let starter = Arc::new(SfnExecutionStarter::new(None).await);
    let router = Arc::new(EventRouter::new(config.dispatch, starter));

    info!("Starting event router lambda");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let router = Arc::clone(&router);
        async move {
            let outcome = router.route(event.payload).await.map_err(|e| {
                error!(error = %e, "Event routing failed");
                e
            })?;
            Ok::<_, lambda_runtime::Error>(outcome)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
