//! Test doubles for the challenge-flow contract tests
//!
//! The remote registrar is mocked at the `ZoneApi` seam with a recording
//! implementation; zone discovery is a fixed suffix table. Both share
//! their interiors behind `Arc` so tests keep handles after moving clones
//! into the provider.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dns01_core::error::{Error, RemoteStep, Result};
use dns01_core::traits::ZoneResolver;
use dns01_provider_gandi::ZoneApi;

/// A `ZoneApi` that records every call and answers from fixed ids
#[derive(Clone)]
pub struct RecordingZoneApi {
    /// Zone id returned for every zone-info lookup
    zone_id: i64,
    /// Zone id returned for every clone
    temp_zone_id: i64,
    /// Version returned for every version-create
    version: i64,
    calls: Arc<Mutex<Vec<String>>>,
    call_count: Arc<AtomicUsize>,
    fail_step: Arc<Mutex<Option<RemoteStep>>>,
}

impl RecordingZoneApi {
    pub fn new(zone_id: i64, temp_zone_id: i64, version: i64) -> Self {
        Self {
            zone_id,
            temp_zone_id,
            version,
            calls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            fail_step: Arc::new(Mutex::new(None)),
        }
    }

    /// Make the given step fail from now on
    pub fn fail_on(&self, step: RemoteStep) {
        *self.fail_step.lock().unwrap() = Some(step);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn observe(&self, step: RemoteStep, call: String) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);

        if *self.fail_step.lock().unwrap() == Some(step) {
            return Err(Error::remote(step, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ZoneApi for RecordingZoneApi {
    async fn zone_id(&self, zone: &str) -> Result<i64> {
        self.observe(RemoteStep::ZoneInfo, format!("zone_id({zone})"))?;
        Ok(self.zone_id)
    }

    async fn clone_zone(&self, zone_id: i64, _name: &str) -> Result<i64> {
        // The clone name embeds a timestamp; keep it out of the recorded
        // call so tests can assert exact sequences.
        self.observe(RemoteStep::ZoneClone, format!("clone_zone({zone_id})"))?;
        Ok(self.temp_zone_id)
    }

    async fn new_zone_version(&self, zone_id: i64) -> Result<i64> {
        self.observe(
            RemoteStep::VersionCreate,
            format!("new_zone_version({zone_id})"),
        )?;
        Ok(self.version)
    }

    async fn add_txt_record(
        &self,
        zone_id: i64,
        version: i64,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<()> {
        self.observe(
            RemoteStep::RecordAdd,
            format!("add_txt_record({zone_id}, {version}, {name}, {value}, {ttl})"),
        )
    }

    async fn set_zone_version(&self, zone_id: i64, version: i64) -> Result<()> {
        self.observe(
            RemoteStep::VersionActivate,
            format!("set_zone_version({zone_id}, {version})"),
        )
    }

    async fn set_zone(&self, zone: &str, zone_id: i64) -> Result<()> {
        self.observe(RemoteStep::ZoneSet, format!("set_zone({zone}, {zone_id})"))
    }

    async fn delete_zone(&self, zone_id: i64) -> Result<()> {
        self.observe(RemoteStep::ZoneDelete, format!("delete_zone({zone_id})"))
    }
}

/// Always resolves to the same zone, whether or not the FQDN is under it
pub struct FixedZoneResolver {
    zone: String,
}

impl FixedZoneResolver {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
        }
    }
}

#[async_trait]
impl ZoneResolver for FixedZoneResolver {
    async fn find_zone(&self, _fqdn: &str) -> Result<String> {
        Ok(self.zone.clone())
    }
}

/// Resolves an FQDN against a fixed list of authoritative zones
pub struct StaticZoneResolver {
    zones: Vec<String>,
}

impl StaticZoneResolver {
    pub fn new(zones: &[&str]) -> Self {
        Self {
            zones: zones.iter().map(|z| z.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ZoneResolver for StaticZoneResolver {
    async fn find_zone(&self, fqdn: &str) -> Result<String> {
        self.zones
            .iter()
            .find(|zone| fqdn.ends_with(&format!(".{zone}")) || fqdn == zone.as_str())
            .cloned()
            .ok_or_else(|| Error::zone_discovery(format!("no known zone for {fqdn}")))
    }
}
