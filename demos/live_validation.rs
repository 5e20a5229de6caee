//! Real-environment validation tool for the Gandi provider
//!
//! Publishes a challenge record for a domain you control, waits for a key
//! press, then cleans up. This makes actual changes at the registrar:
//! the domain's active zone is swapped to a temporary clone for the
//! duration of the run.
//!
//! ## Usage
//!
//! ```bash
//! GANDI_API_KEY=your_key \
//! DNS01_DOMAIN=test.example.com \
//! cargo run --bin live_validation
//! ```
//!
//! ## Environment Variables
//!
//! Required:
//! - `GANDI_API_KEY`: API key for the XML-RPC endpoint
//! - `DNS01_DOMAIN`: domain to publish the challenge under
//!
//! Optional: the usual `GANDI_*` overrides (see the provider crate docs).

use std::env;
use std::sync::Arc;

use dns01_core::challenge::challenge_info;
use dns01_core::traits::ChallengeProvider;
use dns01_provider_gandi::GandiProvider;
use dns01_resolver_dns::SoaZoneResolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let domain = env::var("DNS01_DOMAIN").unwrap_or_else(|_| {
        tracing::error!("DNS01_DOMAIN environment variable is required");
        std::process::exit(1);
    });

    tracing::warn!("this run will swap the active zone of {domain} at the registrar");

    let resolver = Arc::new(SoaZoneResolver::from_system_conf()?);
    let provider = GandiProvider::from_env(resolver)?;

    // A fixed token/key pair is fine for validation; no CA is involved.
    let token = "validation-token";
    let key_auth = format!("{token}.local-validation");
    let info = challenge_info(&domain, &key_auth);

    provider.present(&domain, token, &key_auth).await?;
    tracing::info!(
        "published TXT {} = {}; press Enter to clean up",
        info.effective_fqdn,
        info.value
    );

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    provider.cleanup(&domain, token, &key_auth).await?;
    tracing::info!("original zone restored, temporary zone deleted");

    Ok(())
}
