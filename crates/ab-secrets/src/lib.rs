//! Audience Broker Secrets
//!
//! Resolves the Azure client secret at invocation start. Backends:
//! - AWS Parameter Store (feature `aws-ssm`), SecureString decrypted on read
//! - Environment variables (local runs and tests)
//!
//! The parameter-store client is expensive to build, so lambdas hold it in a
//! [`SharedProvider`]: created on first use, reused by every later invocation
//! of the same process, and released with [`SharedProvider::teardown`].

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use ab_config::SecretsConfig;

mod env;

pub use env::EnvProvider;

#[cfg(feature = "aws-ssm")]
mod aws_parameter_store;
#[cfg(feature = "aws-ssm")]
pub use aws_parameter_store::AwsParameterStoreProvider;

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("Secret not found: {0}")]
    NotFound(String),
    #[error("Invalid key format: {0}")]
    InvalidKey(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Secrets provider trait
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get a secret by key
    async fn get(&self, key: &str) -> Result<String, SecretsError>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Create a provider based on configuration
pub async fn create_provider(config: &SecretsConfig) -> Result<Arc<dyn Provider>, SecretsError> {
    match config.provider.as_str() {
        "env" => {
            info!(prefix = %config.env_prefix, "Using environment variable secrets provider");
            Ok(Arc::new(EnvProvider::with_prefix(&config.env_prefix)))
        }
        #[cfg(feature = "aws-ssm")]
        "aws-ps" => {
            info!("Using AWS Parameter Store provider");
            let region = Some(config.aws_region.clone()).filter(|r| !r.is_empty());
            let provider = AwsParameterStoreProvider::new(region).await?;
            Ok(Arc::new(provider))
        }
        other => Err(SecretsError::ProviderError(format!("Unknown provider: {}", other))),
    }
}

/// Process-scoped, lazily-initialized secrets provider.
///
/// Safe to share between concurrent invocations: the provider is read-only and
/// initialization runs at most once.
pub struct SharedProvider {
    config: SecretsConfig,
    cell: OnceCell<Arc<dyn Provider>>,
}

impl SharedProvider {
    /// Provider built from `config` on first use.
    pub fn new(config: SecretsConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Holder that is already initialized with `provider`.
    pub fn preloaded(provider: Arc<dyn Provider>) -> Self {
        let cell = OnceCell::new();
        // A fresh cell cannot already be set.
        let _ = cell.set(provider);
        Self {
            config: SecretsConfig::default(),
            cell,
        }
    }

    /// Get the provider, creating it on the first call.
    pub async fn get(&self) -> Result<Arc<dyn Provider>, SecretsError> {
        let provider = self
            .cell
            .get_or_try_init(|| async {
                info!(provider = %self.config.provider, "Initializing shared secrets provider");
                create_provider(&self.config).await
            })
            .await?;
        Ok(Arc::clone(provider))
    }

    /// Resolve a secret through the shared provider.
    pub async fn resolve(&self, key: &str) -> Result<String, SecretsError> {
        if key.trim().is_empty() {
            return Err(SecretsError::InvalidKey("Secret key cannot be empty".to_string()));
        }
        self.get().await?.get(key).await
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Release the provider. The next [`get`](Self::get) creates a new one.
    pub fn teardown(&mut self) -> Option<Arc<dyn Provider>> {
        let provider = self.cell.take();
        if provider.is_some() {
            info!("Shared secrets provider released");
        }
        provider
    }

    /// Tear down a holder shared through an `Arc`, once no other owner remains.
    ///
    /// Returns `true` when a provider was released.
    pub fn release(shared: Arc<Self>) -> bool {
        match Arc::try_unwrap(shared) {
            Ok(mut holder) => holder.teardown().is_some(),
            Err(_) => {
                warn!("Shared secrets provider still in use, skipping teardown");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        async fn get(&self, key: &str) -> Result<String, SecretsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if key == "missing" {
                return Err(SecretsError::NotFound(key.to_string()));
            }
            Ok(format!("value-of-{}", key))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_preloaded_provider_is_reused() {
        let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let shared = SharedProvider::preloaded(inner.clone());

        assert!(shared.is_initialized());
        assert_eq!(shared.resolve("a").await.unwrap(), "value-of-a");
        assert_eq!(shared.resolve("b").await.unwrap(), "value-of-b");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_key_rejected_without_provider_call() {
        let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let shared = SharedProvider::preloaded(inner.clone());

        assert!(matches!(shared.resolve("  ").await, Err(SecretsError::InvalidKey(_))));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lazy_env_provider_and_teardown() {
        let mut shared = SharedProvider::new(SecretsConfig {
            provider: "env".to_string(),
            env_prefix: "AB_TEST_LAZY_".to_string(),
            ..Default::default()
        });

        assert!(!shared.is_initialized());
        let provider = shared.get().await.unwrap();
        assert_eq!(provider.name(), "env");
        assert!(shared.is_initialized());

        assert!(shared.teardown().is_some());
        assert!(!shared.is_initialized());
        assert!(shared.teardown().is_none());
    }

    #[test]
    fn test_release_requires_sole_owner() {
        let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let shared = Arc::new(SharedProvider::preloaded(inner));
        let other = Arc::clone(&shared);

        assert!(!SharedProvider::release(shared));
        assert!(other.is_initialized());
        assert!(SharedProvider::release(other));
    }

    #[test]
    fn test_release_uninitialized_holder() {
        let shared = Arc::new(SharedProvider::new(SecretsConfig::default()));
        assert!(!SharedProvider::release(shared));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let shared = SharedProvider::new(SecretsConfig {
            provider: "floppy-disk".to_string(),
            ..Default::default()
        });

        let err = shared.get().await.err().unwrap();
        assert!(matches!(err, SecretsError::ProviderError(_)));
        assert!(!shared.is_initialized());
    }
}
