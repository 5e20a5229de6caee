// # Gandi DNS-01 Challenge Provider
//
// Solves DNS-01 challenges against the legacy Gandi zone API. The API has
// no single "add one record" call for a live zone; instead the provider
// clones the authoritative zone, edits the clone in a fresh version,
// activates that version, and swaps the domain's active assignment over to
// the clone. Cleanup swaps the original zone back and deletes the clone.
//
// ## Coordination
//
// One challenge per authoritative zone may be in flight at a time. The
// provider keeps a ledger of pending challenges behind a single async
// mutex and holds the lock across the entire remote sequence, so
// challenges are fully serialized process-wide. That trades throughput
// for a zone-swap that can never be interleaved with another challenge's.
//
// ## Failure Handling
//
// The remote sequence aborts at the first error, tagged with the step
// that failed. There is no rollback: a failure after the clone leaves an
// orphaned temporary zone at the registrar, which needs manual removal.
// Nothing is retried here; the ACME orchestration layer owns retries.
//
// ## Security
//
// - The API key is read from `GANDI_API_KEY` and never logged
// - Construction fails fast without a key
//
// ## Configuration
//
// Environment variables:
// - `GANDI_API_KEY`: API key (required)
// - `GANDI_BASE_URL`: endpoint override (default: production XML-RPC URL)
// - `GANDI_TTL`: challenge record TTL in seconds (default: 300, clamped
//   up to 300 when configured lower)
// - `GANDI_PROPAGATION_TIMEOUT`: propagation wait in seconds (default: 2400)
// - `GANDI_POLLING_INTERVAL`: propagation poll interval in seconds (default: 60)
// - `GANDI_HTTP_TIMEOUT`: per-RPC HTTP timeout in seconds (default: 60)

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use dns01_core::challenge::{challenge_info, extract_sub_domain, un_fqdn};
use dns01_core::config::{PropagationConfig, ProviderConfig};
use dns01_core::error::{Error, Result};
use dns01_core::state::ChallengeLedger;
use dns01_core::traits::{ChallengeProvider, ChallengeProviderFactory, ZoneResolver};

pub mod rpc;
mod xmlrpc;

pub use rpc::{DEFAULT_BASE_URL, XmlRpcZoneApi, ZoneApi};

/// Lowest TTL the registrar accepts for a record
pub const MIN_TTL: u32 = 300;

/// Environment variable names
pub const ENV_API_KEY: &str = "GANDI_API_KEY";
pub const ENV_BASE_URL: &str = "GANDI_BASE_URL";
pub const ENV_TTL: &str = "GANDI_TTL";
pub const ENV_PROPAGATION_TIMEOUT: &str = "GANDI_PROPAGATION_TIMEOUT";
pub const ENV_POLLING_INTERVAL: &str = "GANDI_POLLING_INTERVAL";
pub const ENV_HTTP_TIMEOUT: &str = "GANDI_HTTP_TIMEOUT";

const DEFAULT_PROPAGATION_TIMEOUT: Duration = Duration::from_secs(40 * 60);
const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider configuration
#[derive(Clone)]
pub struct GandiConfig {
    /// API key for the XML-RPC endpoint
    pub api_key: String,

    /// Endpoint URL
    pub base_url: String,

    /// TTL for the challenge TXT record; values below [`MIN_TTL`] are
    /// clamped at present time, not rejected
    pub ttl: u32,

    /// Propagation wait reported to the ACME layer
    pub propagation_timeout: Duration,

    /// Propagation poll interval reported to the ACME layer
    pub polling_interval: Duration,

    /// Per-RPC HTTP timeout
    pub http_timeout: Duration,
}

// The API key never appears in Debug output.
impl fmt::Debug for GandiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GandiConfig")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("propagation_timeout", &self.propagation_timeout)
            .field("polling_interval", &self.polling_interval)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl GandiConfig {
    /// Configuration with compiled-in defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            ttl: MIN_TTL,
            propagation_timeout: DEFAULT_PROPAGATION_TIMEOUT,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Load configuration from `GANDI_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from a `ProviderConfig::Gandi` value
    pub fn from_provider_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Gandi {
                api_key,
                base_url,
                ttl,
                propagation_timeout_secs,
                polling_interval_secs,
                http_timeout_secs,
            } => {
                let mut loaded = Self::new(api_key.clone());
                if let Some(url) = base_url {
                    if !url.is_empty() {
                        loaded.base_url = url.clone();
                    }
                }
                loaded.ttl = *ttl;
                loaded.propagation_timeout = Duration::from_secs(*propagation_timeout_secs);
                loaded.polling_interval = Duration::from_secs(*polling_interval_secs);
                loaded.http_timeout = Duration::from_secs(*http_timeout_secs);
                loaded.validate()?;
                Ok(loaded)
            }
            _ => Err(Error::config("invalid config for the gandi provider")),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::config("no API key given"));
        }
        Ok(())
    }

    // Environment loading against an injectable lookup, so tests never
    // mutate process-wide environment state.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| Error::config(format!("{ENV_API_KEY} is not set")))?;

        let mut config = Self::new(api_key);
        config.validate()?;

        if let Some(url) = lookup(ENV_BASE_URL) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Some(ttl) = lookup(ENV_TTL) {
            config.ttl = ttl
                .parse()
                .map_err(|_| Error::config(format!("{ENV_TTL} is not an integer: {ttl:?}")))?;
        }
        if let Some(secs) = lookup(ENV_PROPAGATION_TIMEOUT) {
            config.propagation_timeout = parse_secs(ENV_PROPAGATION_TIMEOUT, &secs)?;
        }
        if let Some(secs) = lookup(ENV_POLLING_INTERVAL) {
            config.polling_interval = parse_secs(ENV_POLLING_INTERVAL, &secs)?;
        }
        if let Some(secs) = lookup(ENV_HTTP_TIMEOUT) {
            config.http_timeout = parse_secs(ENV_HTTP_TIMEOUT, &secs)?;
        }

        Ok(config)
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    raw.parse()
        .map(Duration::from_secs)
        .map_err(|_| Error::config(format!("{name} is not an integer: {raw:?}")))
}

/// What `cleanup` needs to reverse one published challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ZoneSwap {
    /// Zone assigned to the domain before the challenge
    zone_id: i64,
    /// Temporary zone holding the original records plus the TXT record
    temp_zone_id: i64,
}

/// Gandi challenge provider
///
/// Owns the pending-challenge ledger; a single instance should be shared
/// (via `Arc`) by everything solving challenges through this account.
pub struct GandiProvider {
    config: GandiConfig,
    api: Arc<dyn ZoneApi>,
    resolver: Arc<dyn ZoneResolver>,
    ledger: Mutex<ChallengeLedger<ZoneSwap>>,
}

impl fmt::Debug for GandiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GandiProvider")
            .field("config", &self.config)
            .finish()
    }
}

impl GandiProvider {
    /// Create a provider talking to the live XML-RPC endpoint.
    ///
    /// Fails fast on a missing API key; no usable provider value exists
    /// without a credential.
    pub fn new(mut config: GandiConfig, resolver: Arc<dyn ZoneResolver>) -> Result<Self> {
        if config.base_url.is_empty() {
            config.base_url = DEFAULT_BASE_URL.to_string();
        }
        let api = XmlRpcZoneApi::new(&config.api_key, &config.base_url, config.http_timeout)?;
        Self::with_zone_api(config, Arc::new(api), resolver)
    }

    /// Create a provider from `GANDI_*` environment variables
    pub fn from_env(resolver: Arc<dyn ZoneResolver>) -> Result<Self> {
        Self::new(GandiConfig::from_env()?, resolver)
    }

    /// Create a provider over a custom [`ZoneApi`] implementation.
    ///
    /// This is the seam tests use to substitute an in-memory registrar.
    pub fn with_zone_api(
        config: GandiConfig,
        api: Arc<dyn ZoneApi>,
        resolver: Arc<dyn ZoneResolver>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            api,
            resolver,
            ledger: Mutex::new(ChallengeLedger::new()),
        })
    }
}

#[async_trait]
impl ChallengeProvider for GandiProvider {
    /// Publish the TXT record by cloning the authoritative zone, adding
    /// the record to a new version of the clone, activating it, and
    /// swapping the domain's active assignment to the clone.
    ///
    /// A failure part-way through leaves no pending entry but may leave
    /// an orphaned temporary zone at the registrar (no rollback).
    async fn present(&self, domain: &str, _token: &str, key_auth: &str) -> Result<()> {
        let info = challenge_info(domain, key_auth);

        // The registrar rejects TTLs under five minutes; clamp, don't fail.
        let ttl = self.config.ttl.max(MIN_TTL);

        let auth_zone = self.resolver.find_zone(&info.effective_fqdn).await?;
        let sub_domain = extract_sub_domain(&info.effective_fqdn, &auth_zone)?;

        // The guard stays held through the whole remote sequence: the
        // in-progress check and the zone mutations must not interleave
        // with another challenge. A busy zone is rejected before any
        // remote call is made.
        let mut ledger = self.ledger.lock().await;
        if ledger.zone_in_progress(&auth_zone) {
            return Err(Error::in_progress(&auth_zone));
        }

        let zone_id = self.api.zone_id(&auth_zone).await?;

        let temp_zone_name = format!(
            "{} [ACME Challenge {}]",
            un_fqdn(&auth_zone),
            Utc::now().format("%d %b %y %H:%M %z"),
        );

        tracing::debug!(
            fqdn = %info.effective_fqdn,
            zone = %auth_zone,
            zone_id,
            "publishing challenge record via zone swap"
        );

        let temp_zone_id = self.api.clone_zone(zone_id, &temp_zone_name).await?;
        let version = self.api.new_zone_version(temp_zone_id).await?;
        self.api
            .add_txt_record(temp_zone_id, version, &sub_domain, &info.value, ttl)
            .await?;
        self.api.set_zone_version(temp_zone_id, version).await?;
        self.api.set_zone(&auth_zone, temp_zone_id).await?;

        ledger.record(
            &info.effective_fqdn,
            &auth_zone,
            ZoneSwap {
                zone_id,
                temp_zone_id,
            },
        )?;

        tracing::info!(
            fqdn = %info.effective_fqdn,
            zone = %auth_zone,
            temp_zone_id,
            "challenge record published"
        );
        Ok(())
    }

    /// Swap the original zone back and delete the temporary one.
    ///
    /// A no-op when nothing is pending for the FQDN: `present` never
    /// completed, or cleanup already ran. If the restore fails the
    /// temporary zone is left alone (it is still the active assignment);
    /// if only the deletion fails the zone is orphaned and the error
    /// surfaces to the caller.
    async fn cleanup(&self, domain: &str, _token: &str, key_auth: &str) -> Result<()> {
        let info = challenge_info(domain, key_auth);

        let mut ledger = self.ledger.lock().await;
        let Some((auth_zone, swap)) = ledger.take(&info.effective_fqdn) else {
            tracing::debug!(
                fqdn = %info.effective_fqdn,
                "no pending challenge, nothing to clean up"
            );
            return Ok(());
        };

        self.api.set_zone(&auth_zone, swap.zone_id).await?;

        if let Err(err) = self.api.delete_zone(swap.temp_zone_id).await {
            tracing::warn!(
                zone = %auth_zone,
                temp_zone_id = swap.temp_zone_id,
                "temporary zone could not be deleted and is now orphaned"
            );
            return Err(err);
        }

        tracing::info!(
            fqdn = %info.effective_fqdn,
            zone = %auth_zone,
            "challenge record removed"
        );
        Ok(())
    }

    fn propagation(&self) -> PropagationConfig {
        PropagationConfig {
            timeout: self.config.propagation_timeout,
            poll_interval: self.config.polling_interval,
        }
    }

    fn provider_name(&self) -> &'static str {
        "gandi"
    }
}

/// Factory for creating Gandi providers
pub struct GandiFactory {
    resolver: Arc<dyn ZoneResolver>,
}

impl GandiFactory {
    /// Factory wiring `resolver` into every created provider
    pub fn new(resolver: Arc<dyn ZoneResolver>) -> Self {
        Self { resolver }
    }
}

impl ChallengeProviderFactory for GandiFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ChallengeProvider>> {
        let config = GandiConfig::from_provider_config(config)?;
        Ok(Box::new(GandiProvider::new(config, self.resolver.clone())?))
    }
}

/// Register the Gandi provider with a registry
pub fn register(registry: &dns01_core::ProviderRegistry, resolver: Arc<dyn ZoneResolver>) {
    registry.register_provider("gandi", Box::new(GandiFactory::new(resolver)));
}
