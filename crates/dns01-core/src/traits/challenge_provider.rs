// # Challenge Provider Trait
//
// Defines the interface the ACME orchestration layer drives to solve a
// DNS-01 challenge against a registrar's API.
//
// ## Implementations
//
// - Gandi (legacy zone-swap API): `dns01-provider-gandi` crate
// - Future: LiveDNS, Cloudflare, Route53, etc.
//
// ## Contract
//
// The orchestrator calls `present` once the challenge material is known,
// waits for propagation using the parameters from `propagation`, asks the
// CA to validate, and finally calls `cleanup` with the same arguments,
// whether or not validation succeeded.

use async_trait::async_trait;

use crate::config::PropagationConfig;

/// Trait for DNS-01 challenge provider implementations
///
/// # Thread Safety
///
/// Implementations must be safe to invoke from multiple concurrent
/// callers. How much of the work actually runs in parallel is up to the
/// provider; serializing internally is a valid choice.
///
/// # Failure Handling
///
/// Providers do not retry. Any error is returned to the orchestrator,
/// which owns retry and backoff policy.
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    /// Publish the TXT record that proves control of `domain`.
    ///
    /// # Parameters
    ///
    /// - `domain`: The domain under validation (e.g. "example.com")
    /// - `token`: The challenge token issued by the CA
    /// - `key_auth`: The pre-computed key authorization; its digest is the
    ///   record value
    async fn present(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), crate::Error>;

    /// Remove whatever `present` published for `domain`.
    ///
    /// Must be idempotent: calling it without a preceding successful
    /// `present`, or calling it twice, is a successful no-op.
    async fn cleanup(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), crate::Error>;

    /// Propagation timeout and polling interval the orchestrator should
    /// use when waiting for the record to become visible.
    fn propagation(&self) -> PropagationConfig;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing challenge providers from configuration
pub trait ChallengeProviderFactory: Send + Sync {
    /// Create a ChallengeProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ChallengeProvider>, crate::Error>;
}
