// # Zone Resolver Trait
//
// Maps a fully-qualified record name to the authoritative zone that owns
// it. Providers need this to know which registrar-side zone to mutate.
//
// Resolution is injected at provider construction so tests can substitute
// a fixed mapping; the production implementation (live SOA walking) lives
// in the `dns01-resolver-dns` crate.

use async_trait::async_trait;

/// Capability for resolving the authoritative zone of an FQDN
#[async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Resolve the authoritative zone owning `fqdn`.
    ///
    /// Returns the zone name with its trailing dot
    /// (e.g. `example.com.` for `_acme-challenge.foo.example.com.`).
    async fn find_zone(&self, fqdn: &str) -> Result<String, crate::Error>;
}
