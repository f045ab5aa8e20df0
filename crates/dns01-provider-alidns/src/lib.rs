// # Alibaba Cloud DNS Client
//
// This crate provides the Alibaba Cloud DNS (alidns) implementation of
// `DnsClient` for the DNS-01 solver.
//
// ## Behavior
//
// - One signed HTTPS request per trait call
// - Full error propagation to the solver (no retry, no backoff)
// - HTTP timeout configured (30 seconds)
// - Specific error messages for HTTP status codes (401/403, 404, 429, 5xx)
// - No caching: a client lives for one challenge request
//
// ## Security Requirements
//
// - The access key secret NEVER appears in logs or `Debug` output
// - Construction fails fast if either half of the key pair is empty
//
// ## API Reference
//
// RPC style, `GET https://alidns.aliyuncs.com/?Action=...`, version 2015-01-09:
// - `DescribeDomains`: zone lookup by keyword
// - `AddDomainRecord`: create a record
// - `DescribeDomainRecords`: list records of a zone
// - `DeleteDomainRecord`: delete a record by id

mod model;
pub mod signature;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use dns01_core::traits::{
    DnsClient, DnsClientFactory, RECORD_TYPE_TXT, SearchMode, TxtRecord, Zone,
};
use dns01_core::{Dns01Solver, Error, ProviderCredential, ProviderRegistry, Result};

use model::{
    AddDomainRecordResponse, ApiError, DeleteDomainRecordResponse, DescribeDomainRecordsResponse,
    DescribeDomainsResponse,
};

/// Provider type name in the registry
pub const PROVIDER_NAME: &str = "alidns";

/// Solver identity reported to the host
pub const SOLVER_NAME: &str = "alidns";

/// Public API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://alidns.aliyuncs.com/";

/// Region used when the solver config names none
pub const DEFAULT_REGION: &str = "cn-hangzhou";

/// API version all actions are issued against
const API_VERSION: &str = "2015-01-09";

/// Largest page the list actions accept
const PAGE_SIZE: &str = "500";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Alibaba Cloud DNS client
///
/// Built per challenge request from that request's credentials.
pub struct AlidnsClient {
    access_key_id: String,

    /// ⚠️ NEVER log this value
    access_key_secret: String,

    region: String,

    /// Base URL, `DEFAULT_ENDPOINT` outside of tests
    endpoint: String,

    http: reqwest::Client,
}

// Custom Debug implementation that hides the access key secret
impl std::fmt::Debug for AlidnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlidnsClient")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl AlidnsClient {
    /// Create a client for `region` (empty means [`DEFAULT_REGION`])
    ///
    /// Fails with [`Error::ClientConstruction`] when either half of the key
    /// pair is empty or the HTTP client cannot be built.
    pub fn new(region: &str, credential: &ProviderCredential) -> Result<Self> {
        if credential.access_key_id().is_empty() {
            return Err(Error::client_construction("alidns access key id is empty"));
        }
        if credential.access_key_secret().is_empty() {
            return Err(Error::client_construction(
                "alidns access key secret is empty",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::client_construction(format!("HTTP client: {}", e)))?;

        let region = if region.is_empty() {
            DEFAULT_REGION
        } else {
            region
        };

        Ok(Self {
            access_key_id: credential.access_key_id().to_string(),
            access_key_secret: credential.access_key_secret().to_string(),
            region: region.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http,
        })
    }

    /// Send requests to `endpoint` instead of the public API
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        self.endpoint = endpoint;
        self
    }

    /// Region the client signs requests for
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Base URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn signed_url(&self, action: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut all: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>());

        for (k, v) in [
            ("Action", action),
            ("Format", "JSON"),
            ("Version", API_VERSION),
            ("AccessKeyId", self.access_key_id.as_str()),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureVersion", "1.0"),
            ("SignatureNonce", nonce.as_str()),
            ("Timestamp", timestamp.as_str()),
            ("RegionId", self.region.as_str()),
        ] {
            all.insert(k.to_string(), v.to_string());
        }

        let (canonical, signature) = signature::sign(&all, &self.access_key_secret)?;
        Ok(format!(
            "{}?{}&Signature={}",
            self.endpoint,
            canonical,
            signature::percent_encode(&signature)
        ))
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, params: &[(&str, &str)]) -> Result<T> {
        tracing::debug!(action, region = %self.region, "Calling alidns API");

        let url = self.signed_url(action, params)?;
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status_error(action, status, &body));
        }

        response.json::<T>().await.map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("{}: Failed to parse response: {}", action, e),
            )
        })
    }
}

fn map_status_error(action: &str, status: reqwest::StatusCode, body: &str) -> Error {
    let api: ApiError = serde_json::from_str(body).unwrap_or_else(|_| ApiError {
        message: body.to_string(),
        ..ApiError::default()
    });
    let detail = match &api.request_id {
        Some(id) => format!("{} {} (request {})", api.code, api.message, id),
        None => format!("{} {}", api.code, api.message),
    };
    let detail = detail.trim();

    let message = match status.as_u16() {
        401 | 403 => format!(
            "{}: Authentication failed: invalid access key or insufficient permissions. Status: {} - {}",
            action, status, detail
        ),
        404 => format!("{}: Not found. Status: {} - {}", action, status, detail),
        429 => format!(
            "{}: Rate limit exceeded. Please retry later. Status: {} - {}",
            action, status, detail
        ),
        500..=599 => format!(
            "{}: alidns server error (transient): {} - {}",
            action, status, detail
        ),
        _ => format!("{}: Request failed: {} - {}", action, status, detail),
    };

    tracing::warn!(action, status = status.as_u16(), code = %api.code, "alidns API call failed");
    Error::provider(PROVIDER_NAME, message)
}

#[async_trait]
impl DnsClient for AlidnsClient {
    async fn describe_zones(&self, keyword: &str, mode: SearchMode) -> Result<Vec<Zone>> {
        let resp: DescribeDomainsResponse = self
            .call(
                "DescribeDomains",
                &[
                    ("KeyWord", keyword),
                    ("SearchMode", mode.as_str()),
                    ("PageSize", PAGE_SIZE),
                ],
            )
            .await?;

        Ok(resp
            .domains
            .domain
            .into_iter()
            .map(|d| Zone {
                name: d.domain_name,
                id: d.domain_id,
            })
            .collect())
    }

    async fn add_txt_record(&self, zone: &str, rr: &str, value: &str) -> Result<String> {
        let resp: AddDomainRecordResponse = self
            .call(
                "AddDomainRecord",
                &[
                    ("DomainName", zone),
                    ("RR", rr),
                    ("Type", RECORD_TYPE_TXT),
                    ("Value", value),
                ],
            )
            .await?;

        tracing::debug!(zone, rr, record_id = %resp.record_id, "TXT record added");
        Ok(resp.record_id)
    }

    async fn describe_txt_records(&self, zone: &str, rr_keyword: &str) -> Result<Vec<TxtRecord>> {
        let resp: DescribeDomainRecordsResponse = self
            .call(
                "DescribeDomainRecords",
                &[
                    ("DomainName", zone),
                    ("RRKeyWord", rr_keyword),
                    ("Type", RECORD_TYPE_TXT),
                    ("PageSize", PAGE_SIZE),
                ],
            )
            .await?;

        Ok(resp
            .domain_records
            .record
            .into_iter()
            .map(|r| TxtRecord {
                record_id: r.record_id,
                rr: r.rr,
                value: r.value,
                record_type: r.record_type,
                ttl: r.ttl,
            })
            .collect())
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let resp: DeleteDomainRecordResponse = self
            .call("DeleteDomainRecord", &[("RecordId", record_id)])
            .await?;

        tracing::debug!(record_id = ?resp.record_id, "Record deleted");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating alidns clients
#[derive(Debug, Clone, Default)]
pub struct AlidnsFactory {
    endpoint: Option<String>,
}

impl AlidnsFactory {
    /// Factory whose clients talk to `endpoint`
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
        }
    }
}

impl DnsClientFactory for AlidnsFactory {
    fn create(&self, region: &str, credential: &ProviderCredential) -> Result<Box<dyn DnsClient>> {
        let mut client = AlidnsClient::new(region, credential)?;
        if let Some(endpoint) = &self.endpoint {
            client = client.with_endpoint(endpoint.clone());
        }
        Ok(Box::new(client))
    }
}

/// Register the alidns client with a registry
///
/// # Example
///
/// ```rust
/// use dns01_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dns01_provider_alidns::register(&registry);
/// assert!(registry.has_client("alidns"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_client(PROVIDER_NAME, Box::new(AlidnsFactory::default()));
}

/// Solver named [`SOLVER_NAME`] that builds alidns clients from `registry`
///
/// The registry must have [`register`] applied (or an equivalent factory
/// under [`PROVIDER_NAME`]).
pub fn solver(registry: Arc<ProviderRegistry>) -> Dns01Solver {
    Dns01Solver::new(SOLVER_NAME, PROVIDER_NAME, registry)
}
