// # Live DNS Zone Discovery
//
// Production implementation of the `ZoneResolver` capability: find the
// authoritative zone of an FQDN by querying live DNS for SOA records,
// walking up one label at a time until a zone answers.
//
// `_acme-challenge.foo.example.com.` typically has no SOA of its own, nor
// does `foo.example.com.`; the walk ends at `example.com.`, whose SOA
// names the zone the registrar actually serves.
//
// The resolver instance is owned by whoever constructs it; there is no
// process-wide singleton, so embedders can run several configurations
// side by side.

use async_trait::async_trait;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::{IntoName, Name, TokioAsyncResolver};

use dns01_core::challenge::to_fqdn;
use dns01_core::error::{Error, Result};
use dns01_core::traits::ZoneResolver;

/// `ZoneResolver` backed by live SOA lookups
pub struct SoaZoneResolver {
    resolver: TokioAsyncResolver,
}

impl SoaZoneResolver {
    /// Build a resolver from the system configuration
    /// (`/etc/resolv.conf` or the platform equivalent).
    pub fn from_system_conf() -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| Error::zone_discovery(format!("failed to initialize DNS resolver: {e}")))?;
        Ok(Self { resolver })
    }

    /// Wrap an already-configured resolver
    pub fn with_resolver(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }

    async fn soa_zone(&self, name: &Name) -> std::result::Result<Option<String>, ResolveError> {
        match self.resolver.soa_lookup(name.clone()).await {
            Ok(lookup) => {
                let zone = lookup
                    .as_lookup()
                    .records()
                    .first()
                    .map(|record| record.name().to_utf8());
                Ok(zone)
            }
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ZoneResolver for SoaZoneResolver {
    async fn find_zone(&self, fqdn: &str) -> Result<String> {
        let mut name = fqdn
            .into_name()
            .map_err(|e| Error::zone_discovery(format!("invalid FQDN {fqdn}: {e}")))?;

        loop {
            let answer = self
                .soa_zone(&name)
                .await
                .map_err(|e| Error::zone_discovery(format!("SOA lookup for {name} failed: {e}")))?;

            match answer {
                Some(zone) => {
                    tracing::debug!(fqdn, zone = %zone, "authoritative zone discovered");
                    return Ok(to_fqdn(&zone));
                }
                None if name.num_labels() > 1 => name = name.base_name(),
                None => {
                    return Err(Error::zone_discovery(format!(
                        "no authoritative zone found for {fqdn}"
                    )));
                }
            }
        }
    }
}
