//! Configuration types for challenge providers
//!
//! This module defines the provider-selection configuration consumed by
//! the registry, and the propagation parameters handed back to the ACME
//! orchestration layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long the ACME layer should wait for the published record to
/// propagate, and how often it should re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationConfig {
    /// Total time to wait before giving up on propagation
    pub timeout: Duration,

    /// Interval between propagation checks
    pub poll_interval: Duration,
}

/// Challenge provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Gandi provider (legacy zone-swap API)
    Gandi {
        /// API key for the XML-RPC endpoint
        api_key: String,

        /// Endpoint override; the compiled-in production URL is used when
        /// absent or empty
        #[serde(default)]
        base_url: Option<String>,

        /// TTL for the challenge TXT record, in seconds
        #[serde(default = "default_ttl")]
        ttl: u32,

        /// Propagation timeout, in seconds
        #[serde(default = "default_propagation_timeout_secs")]
        propagation_timeout_secs: u64,

        /// Propagation polling interval, in seconds
        #[serde(default = "default_polling_interval_secs")]
        polling_interval_secs: u64,

        /// HTTP client timeout, in seconds
        #[serde(default = "default_http_timeout_secs")]
        http_timeout_secs: u64,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Gandi { api_key, .. } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("Gandi API key cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Gandi { .. } => "gandi",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_ttl() -> u32 {
    300
}

fn default_propagation_timeout_secs() -> u64 {
    // Registrar-side zone swaps take noticeably longer to propagate than
    // plain record edits.
    40 * 60
}

fn default_polling_interval_secs() -> u64 {
    60
}

fn default_http_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_fails_validation() {
        let config = ProviderConfig::Gandi {
            api_key: String::new(),
            base_url: None,
            ttl: default_ttl(),
            propagation_timeout_secs: default_propagation_timeout_secs(),
            polling_interval_secs: default_polling_interval_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_are_applied_when_deserializing() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"type": "gandi", "api_key": "secret"}"#).unwrap();
        config.validate().unwrap();

        match config {
            ProviderConfig::Gandi {
                ttl,
                propagation_timeout_secs,
                polling_interval_secs,
                http_timeout_secs,
                base_url,
                ..
            } => {
                assert_eq!(ttl, 300);
                assert_eq!(propagation_timeout_secs, 2400);
                assert_eq!(polling_interval_secs, 60);
                assert_eq!(http_timeout_secs, 60);
                assert!(base_url.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn type_name_matches_the_registry_key() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"type": "gandi", "api_key": "secret"}"#).unwrap();
        assert_eq!(config.type_name(), "gandi");
    }
}
