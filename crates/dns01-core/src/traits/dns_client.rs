// # DNS Client Trait
//
// Defines the record-management capability the solver consumes from a DNS
// provider: zone lookup plus TXT record create/list/delete.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `dns01-provider-alidns` crate
//
// ## Usage
//
// ```rust,ignore
// use dns01_core::traits::{DnsClient, SearchMode};
//
// async fn publish(client: &dyn DnsClient) -> dns01_core::Result<()> {
//     let zones = client.describe_zones("example.com", SearchMode::Exact).await?;
//     let record_id = client
//         .add_txt_record(&zones[0].name, "_acme-challenge", "token123")
//         .await?;
//     client.delete_record(&record_id).await
// }
// ```

use async_trait::async_trait;

/// Record type managed by this system
pub const RECORD_TYPE_TXT: &str = "TXT";

/// How a zone keyword is matched by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Zone name must equal the keyword
    #[default]
    Exact,
    /// Zone name may contain the keyword
    Like,
}

impl SearchMode {
    /// Wire name of the search mode
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Exact => "EXACT",
            SearchMode::Like => "LIKE",
        }
    }
}

/// A provider-registered DNS zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Canonical domain name as registered with the provider
    pub name: String,
    /// Provider-specific zone identifier, when the provider reports one
    pub id: Option<String>,
}

impl Zone {
    /// Create a zone with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

/// A TXT record as observed on the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecord {
    /// Provider-assigned identifier, required for deletion
    pub record_id: String,
    /// Zone-relative record name
    pub rr: String,
    /// TXT payload
    pub value: String,
    /// Record type, always [`RECORD_TYPE_TXT`] for this system
    pub record_type: String,
    /// Time-to-live, if reported
    pub ttl: Option<u32>,
}

/// Trait for DNS provider clients
///
/// A client is built per challenge request from that request's credentials
/// and dropped when the request finishes. It must not cache records or zones
/// beyond a single call.
///
/// # Error handling
///
/// Every method returns [`Error::ProviderRequest`](crate::Error::ProviderRequest)
/// for failures of the remote call. Clients do not retry; retry policy
/// belongs to the host that invokes the solver.
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// List zones matching `keyword`
    ///
    /// With [`SearchMode::Exact`] the result holds at most the one zone whose
    /// name equals `keyword`.
    async fn describe_zones(
        &self,
        keyword: &str,
        mode: SearchMode,
    ) -> Result<Vec<Zone>, crate::Error>;

    /// Create a TXT record and return its provider-assigned identifier
    ///
    /// Providers are expected to accept several TXT records with the same
    /// relative name.
    async fn add_txt_record(
        &self,
        zone: &str,
        rr: &str,
        value: &str,
    ) -> Result<String, crate::Error>;

    /// List TXT records in `zone` whose relative name matches `rr_keyword`
    ///
    /// Providers may return keyword-prefix matches; callers filter for the
    /// exact relative name themselves.
    async fn describe_txt_records(
        &self,
        zone: &str,
        rr_keyword: &str,
    ) -> Result<Vec<TxtRecord>, crate::Error>;

    /// Delete a record by its provider-assigned identifier
    async fn delete_record(&self, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS clients from per-request credentials
pub trait DnsClientFactory: Send + Sync {
    /// Create a DnsClient bound to `region` and `credential`
    ///
    /// # Returns
    ///
    /// A boxed DnsClient, or [`Error::ClientConstruction`](crate::Error::ClientConstruction)
    fn create(
        &self,
        region: &str,
        credential: &crate::credential::ProviderCredential,
    ) -> Result<Box<dyn DnsClient>, crate::Error>;
}
