//! Plugin-based provider registry
//!
//! The registry allows challenge providers to be registered dynamically
//! at runtime, avoiding hardcoded if-else chains in embedding code.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dns01_core::registry::ProviderRegistry;
//! use dns01_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::new();
//!
//! // Provider crates register themselves during initialization:
//! dns01_provider_gandi::register(&registry, resolver);
//!
//! // Create a provider from config
//! let config = ProviderConfig::Gandi { /* ... */ };
//! let provider = registry.create_provider(&config)?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{ChallengeProvider, ChallengeProviderFactory};

/// Provider registry for plugin-based challenge provider creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Box<dyn ChallengeProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a challenge provider factory under `name`.
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn ChallengeProviderFactory>) {
        let name = name.into();
        tracing::debug!(provider = %name, "registering challenge provider factory");

        let mut providers = self.providers.write().expect("provider registry lock poisoned");
        providers.insert(name, factory);
    }

    /// Create a provider instance for `config`
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn ChallengeProvider>> {
        let providers = self.providers.read().expect("provider registry lock poisoned");

        let factory = providers.get(config.type_name()).ok_or_else(|| {
            Error::config(format!(
                "no challenge provider registered for type '{}'",
                config.type_name()
            ))
        })?;

        factory.create(config)
    }

    /// Names of all registered providers
    pub fn registered_providers(&self) -> Vec<String> {
        let providers = self.providers.read().expect("provider registry lock poisoned");
        providers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropagationConfig;
    use async_trait::async_trait;
    use std::time::Duration;

    struct NullProvider;

    #[async_trait]
    impl ChallengeProvider for NullProvider {
        async fn present(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }

        async fn cleanup(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }

        fn propagation(&self) -> PropagationConfig {
            PropagationConfig {
                timeout: Duration::from_secs(60),
                poll_interval: Duration::from_secs(5),
            }
        }

        fn provider_name(&self) -> &'static str {
            "null"
        }
    }

    struct NullFactory;

    impl ChallengeProviderFactory for NullFactory {
        fn create(&self, _config: &ProviderConfig) -> Result<Box<dyn ChallengeProvider>> {
            Ok(Box::new(NullProvider))
        }
    }

    #[test]
    fn create_dispatches_on_the_config_type_name() {
        let registry = ProviderRegistry::new();
        registry.register_provider("gandi", Box::new(NullFactory));

        let config = ProviderConfig::Gandi {
            api_key: "secret".to_string(),
            base_url: None,
            ttl: 300,
            propagation_timeout_secs: 2400,
            polling_interval_secs: 60,
            http_timeout_secs: 60,
        };

        let provider = registry.create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "null");
    }

    #[test]
    fn unknown_provider_type_is_a_config_error() {
        let registry = ProviderRegistry::new();

        let config = ProviderConfig::Custom {
            factory: "unregistered".to_string(),
            config: serde_json::json!({}),
        };

        let err = match registry.create_provider(&config) {
            Ok(_) => panic!("expected create_provider to fail"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn registered_providers_lists_names() {
        let registry = ProviderRegistry::new();
        registry.register_provider("gandi", Box::new(NullFactory));

        assert_eq!(registry.registered_providers(), vec!["gandi".to_string()]);
    }
}
