// # Zone API
//
// The outbound surface of the provider: seven zone-management operations
// on the registrar, behind a trait so tests (and embedders with their own
// transport) can substitute an in-memory registrar. `XmlRpcZoneApi` is the
// production implementation over the legacy XML-RPC endpoint.
//
// Each method is one logical RPC. No retries here; failures abort the
// coordinator's sequence and surface to the ACME layer.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use dns01_core::error::{Error, RemoteStep, Result};

use crate::xmlrpc::{self, Response, Value};

/// Production XML-RPC endpoint
pub const DEFAULT_BASE_URL: &str = "https://rpc.gandi.net/xmlrpc/";

/// Remote zone-management operations used to solve a challenge
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// Id of the zone currently assigned to `zone` (the authoritative
    /// zone name, trailing dot accepted)
    async fn zone_id(&self, zone: &str) -> Result<i64>;

    /// Clone zone `zone_id` into a new zone called `name`; returns the
    /// new zone's id
    async fn clone_zone(&self, zone_id: i64, name: &str) -> Result<i64>;

    /// Create a new mutable version of zone `zone_id`; returns the
    /// version number
    async fn new_zone_version(&self, zone_id: i64) -> Result<i64>;

    /// Insert a TXT record into `version` of zone `zone_id`
    async fn add_txt_record(
        &self,
        zone_id: i64,
        version: i64,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<()>;

    /// Activate `version` as the live version of zone `zone_id`
    async fn set_zone_version(&self, zone_id: i64, version: i64) -> Result<()>;

    /// Point `zone`'s active assignment at zone `zone_id`
    async fn set_zone(&self, zone: &str, zone_id: i64) -> Result<()>;

    /// Delete zone `zone_id`
    async fn delete_zone(&self, zone_id: i64) -> Result<()>;
}

/// XML-RPC client for the legacy zone API
pub struct XmlRpcZoneApi {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

// The API key never appears in Debug output.
impl fmt::Debug for XmlRpcZoneApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlRpcZoneApi")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl XmlRpcZoneApi {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// The timeout bounds every individual RPC; the coordinator adds no
    /// timeout of its own.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http_timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("no API key given"));
        }

        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.into(),
            client,
        })
    }

    /// Issue one RPC. The API key is always the first parameter.
    async fn call(&self, step: RemoteStep, method: &str, params: Vec<Value>) -> Result<Value> {
        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.push(Value::string(&self.api_key));
        all_params.extend(params);

        let body = xmlrpc::method_call(method, &all_params);

        tracing::debug!(%step, method, "calling zone API");

        let response = self
            .client
            .post(&self.base_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::remote(step, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::remote(step, format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(Error::remote(step, format!("HTTP status {status}")));
        }

        match xmlrpc::parse_response(&text).map_err(|e| Error::remote(step, e.to_string()))? {
            Response::Value(value) => Ok(value),
            Response::Fault(fault) => Err(Error::remote(
                step,
                format!("fault {}: {}", fault.code, fault.message),
            )),
        }
    }
}

#[async_trait]
impl ZoneApi for XmlRpcZoneApi {
    async fn zone_id(&self, zone: &str) -> Result<i64> {
        let info = self
            .call(RemoteStep::ZoneInfo, "domain.info", vec![Value::string(zone)])
            .await?;

        info.get("zone_id").and_then(Value::as_i64).ok_or_else(|| {
            Error::remote(
                RemoteStep::ZoneInfo,
                format!("no zone_id in domain.info response for {zone}"),
            )
        })
    }

    async fn clone_zone(&self, zone_id: i64, name: &str) -> Result<i64> {
        let mut opts = BTreeMap::new();
        opts.insert("name".to_string(), Value::string(name));

        let cloned = self
            .call(
                RemoteStep::ZoneClone,
                "domain.zone.clone",
                // Version 0 clones the currently active version.
                vec![Value::Int(zone_id), Value::Int(0), Value::Struct(opts)],
            )
            .await?;

        cloned.get("id").and_then(Value::as_i64).ok_or_else(|| {
            Error::remote(
                RemoteStep::ZoneClone,
                format!("no id in domain.zone.clone response for zone {zone_id}"),
            )
        })
    }

    async fn new_zone_version(&self, zone_id: i64) -> Result<i64> {
        let version = self
            .call(
                RemoteStep::VersionCreate,
                "domain.zone.version.new",
                vec![Value::Int(zone_id)],
            )
            .await?;

        version.as_i64().ok_or_else(|| {
            Error::remote(
                RemoteStep::VersionCreate,
                format!("non-integer domain.zone.version.new response for zone {zone_id}"),
            )
        })
    }

    async fn add_txt_record(
        &self,
        zone_id: i64,
        version: i64,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<()> {
        let mut record = BTreeMap::new();
        record.insert("name".to_string(), Value::string(name));
        record.insert("type".to_string(), Value::string("TXT"));
        record.insert("value".to_string(), Value::string(value));
        record.insert("ttl".to_string(), Value::Int(i64::from(ttl)));

        self.call(
            RemoteStep::RecordAdd,
            "domain.zone.record.add",
            vec![Value::Int(zone_id), Value::Int(version), Value::Struct(record)],
        )
        .await?;
        Ok(())
    }

    async fn set_zone_version(&self, zone_id: i64, version: i64) -> Result<()> {
        let activated = self
            .call(
                RemoteStep::VersionActivate,
                "domain.zone.version.set",
                vec![Value::Int(zone_id), Value::Int(version)],
            )
            .await?
            .as_bool()
            .unwrap_or(false);

        if !activated {
            return Err(Error::remote(
                RemoteStep::VersionActivate,
                format!("version {version} of zone {zone_id} was not activated"),
            ));
        }
        Ok(())
    }

    async fn set_zone(&self, zone: &str, zone_id: i64) -> Result<()> {
        self.call(
            RemoteStep::ZoneSet,
            "domain.zone.set",
            vec![Value::string(zone), Value::Int(zone_id)],
        )
        .await?;
        Ok(())
    }

    async fn delete_zone(&self, zone_id: i64) -> Result<()> {
        let deleted = self
            .call(
                RemoteStep::ZoneDelete,
                "domain.zone.delete",
                vec![Value::Int(zone_id)],
            )
            .await?
            .as_bool()
            .unwrap_or(false);

        if !deleted {
            return Err(Error::remote(
                RemoteStep::ZoneDelete,
                format!("zone {zone_id} was not deleted"),
            ));
        }
        Ok(())
    }
}
