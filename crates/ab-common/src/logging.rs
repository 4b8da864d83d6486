//! Logging setup for the lambdas and local tools.
//!
//! Lambdas log one JSON object per line to CloudWatch; local runs get
//! coloured text. Pipeline spans carry `account`, `role_name` and `app_name`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ab_common::logging::init_lambda_logging;
//!
//! #[tokio::main]
//! async fn main() {
//!     init_lambda_logging("ab-create-audience");
//!
//!     tracing::info!(app_name = %name, "Checking application");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: "json" for JSON output, "text" for human-readable output
//! - `RUST_LOG`: Standard log level filter (default: info)
//!   Examples: `RUST_LOG=debug`, `RUST_LOG=ab_directory=trace`
//!
//! Without `RUST_LOG`, the AWS SDK and HTTP stack are limited to warnings.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn,hyper=warn,reqwest=warn";

/// Output format selected from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value, falling back to `default` when unset or unknown.
    pub fn parse(value: Option<&str>, default: LogFormat) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "text" || v == "pretty" => LogFormat::Text,
            _ => default,
        }
    }
}

/// Initialize logging for a long-running or local process (text by default).
pub fn init_logging(service_name: &str) {
    init_with_default(service_name, LogFormat::Text);
}

/// Initialize logging inside a lambda (JSON by default, no ANSI colours).
pub fn init_lambda_logging(service_name: &str) {
    init_with_default(service_name, LogFormat::Json);
}

fn init_with_default(service_name: &str, default: LogFormat) {
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref(), default);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Text => init_text_logging(env_filter),
    }

    tracing::debug!(service = service_name, ?format, "Logging initialized");
}

// Timestamps come from CloudWatch.
fn init_json_logging(env_filter: EnvFilter) {
    let layer = fmt::layer()
        .json()
        .without_time()
        .with_ansi(false)
        .with_current_span(true)
        .with_span_list(false)
        .flatten_event(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(env_filter).with(layer).init();
}

fn init_text_logging(env_filter: EnvFilter) {
    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry().with(env_filter).with(layer).init();
}
