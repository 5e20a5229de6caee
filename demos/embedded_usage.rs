//! Minimal embedding example for the DNS-01 toolkit
//!
//! Runs a present/cleanup round trip against an in-memory registrar, so
//! it works offline and never touches a real account. The printed call
//! log is the exact remote sequence the provider would issue for real.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dns01_core::Result;
use dns01_core::traits::{ChallengeProvider, ZoneResolver};
use dns01_provider_gandi::{GandiConfig, GandiProvider, ZoneApi};

/// In-memory registrar that logs every zone operation
#[derive(Clone, Default)]
struct InMemoryZoneApi {
    calls: Arc<Mutex<Vec<String>>>,
}

impl InMemoryZoneApi {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ZoneApi for InMemoryZoneApi {
    async fn zone_id(&self, zone: &str) -> Result<i64> {
        self.log(format!("zone_id({zone})"));
        Ok(10)
    }

    async fn clone_zone(&self, zone_id: i64, name: &str) -> Result<i64> {
        self.log(format!("clone_zone({zone_id}, {name:?})"));
        Ok(11)
    }

    async fn new_zone_version(&self, zone_id: i64) -> Result<i64> {
        self.log(format!("new_zone_version({zone_id})"));
        Ok(2)
    }

    async fn add_txt_record(
        &self,
        zone_id: i64,
        version: i64,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<()> {
        self.log(format!(
            "add_txt_record({zone_id}, {version}, {name}, {value}, {ttl})"
        ));
        Ok(())
    }

    async fn set_zone_version(&self, zone_id: i64, version: i64) -> Result<()> {
        self.log(format!("set_zone_version({zone_id}, {version})"));
        Ok(())
    }

    async fn set_zone(&self, zone: &str, zone_id: i64) -> Result<()> {
        self.log(format!("set_zone({zone}, {zone_id})"));
        Ok(())
    }

    async fn delete_zone(&self, zone_id: i64) -> Result<()> {
        self.log(format!("delete_zone({zone_id})"));
        Ok(())
    }
}

/// Zone discovery pinned to one zone, standing in for live DNS
struct OneZoneResolver;

#[async_trait]
impl ZoneResolver for OneZoneResolver {
    async fn find_zone(&self, _fqdn: &str) -> Result<String> {
        Ok("example.com.".to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let api = InMemoryZoneApi::default();
    let provider = GandiProvider::with_zone_api(
        GandiConfig::new("demo-api-key"),
        Arc::new(api.clone()),
        Arc::new(OneZoneResolver),
    )?;

    provider.present("example.com", "token", "key-authorization").await?;
    println!("record published; propagation config: {:?}", provider.propagation());

    provider.cleanup("example.com", "token", "key-authorization").await?;
    println!("record removed");

    println!("\nremote calls issued:");
    for call in api.calls() {
        println!("  {call}");
    }

    Ok(())
}
