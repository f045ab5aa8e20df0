//! Challenge lifecycle controller
//!
//! A [`Solver`] publishes and withdraws the TXT record of one DNS-01
//! validation attempt:
//!
//! ```text
//!                 ┌──────────────────┐
//!  Challenge ───► │   Dns01Solver    │
//!  Request        └──────────────────┘
//!                          │
//!     ┌────────────────────┼─────────────────────┐
//!     ▼                    ▼                     ▼
//! ┌─────────────┐  ┌──────────────────┐  ┌──────────────┐
//! │ SecretStore │  │ ProviderRegistry │  │   Resolver   │
//! │ (creds)     │  │ (DnsClient)      │  │ (zone / RR)  │
//! └─────────────┘  └──────────────────┘  └──────────────┘
//! ```
//!
//! ## Present
//!
//! 1. Decode the request config and resolve credentials in its namespace
//! 2. Build a provider client for this request
//! 3. Resolve the hosted zone and the relative record name
//! 4. Add the TXT record (no duplicate check; repeats may create duplicates)
//!
//! ## CleanUp
//!
//! Steps 1-3 as above, then list TXT records under the relative name, keep
//! the exact name matches and delete the one whose value is the challenge
//! key. Records carrying other keys are left alone.
//!
//! Every failure is returned wrapped in [`Error::Challenge`] naming the
//! operation and FQDN. Nothing is retried and nothing is rolled back.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::challenge::ChallengeRequest;
use crate::config::{HostConfig, SolverConfig, SolverOptions};
use crate::credential::ProviderCredential;
use crate::error::{Error, Operation, Result};
use crate::registry::ProviderRegistry;
use crate::resolver::{extract_rr, get_hosted_zone, try_extract_rr, un_fqdn};
use crate::traits::{DnsClient, SecretStore};

/// Process-wide shutdown trigger handed to [`Solver::initialize`]
///
/// Flips to `true` once the host begins shutting down.
pub type ShutdownSignal = watch::Receiver<bool>;

/// Host-facing solver interface
#[async_trait]
pub trait Solver: Send + Sync {
    /// Stable solver identity used by the host for routing
    fn name(&self) -> &str;

    /// One-time setup at process start
    ///
    /// Builds the secret store described by `config` and keeps the shutdown
    /// signal. Must be called before [`present`](Solver::present) or
    /// [`clean_up`](Solver::clean_up).
    async fn initialize(&mut self, config: HostConfig, shutdown: ShutdownSignal) -> Result<()>;

    /// Publish the TXT record for a challenge
    async fn present(&self, request: &ChallengeRequest) -> Result<()>;

    /// Remove the TXT record published for a challenge
    async fn clean_up(&self, request: &ChallengeRequest) -> Result<()>;
}

/// Provider client and record coordinates for one request
struct Target {
    client: Box<dyn DnsClient>,
    zone: String,
    rr: String,
}

/// DNS-01 solver backed by a registered [`DnsClient`] provider
pub struct Dns01Solver {
    /// Solver identity
    name: String,

    /// Registered provider type used to build clients
    provider: String,

    /// Client and secret store factories
    registry: Arc<ProviderRegistry>,

    /// Set by `initialize`
    secret_store: Option<Arc<dyn SecretStore>>,

    /// Set by `initialize`; stored only
    shutdown: Option<ShutdownSignal>,

    options: SolverOptions,
}

impl std::fmt::Debug for Dns01Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dns01Solver")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field(
                "secret_store",
                &self.secret_store.as_ref().map(|s| s.store_name()),
            )
            .field("options", &self.options)
            .finish()
    }
}

impl Dns01Solver {
    /// Create a solver named `name` that builds clients of type `provider`
    ///
    /// The provider type must be registered in `registry` by the time a
    /// challenge arrives.
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            registry,
            secret_store: None,
            shutdown: None,
            options: SolverOptions::default(),
        }
    }

    /// Set behavior switches
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Current behavior switches
    pub fn options(&self) -> SolverOptions {
        self.options
    }

    /// Whether [`Solver::initialize`] has completed
    pub fn is_initialized(&self) -> bool {
        self.secret_store.is_some()
    }

    /// Whether the host has signalled shutdown
    ///
    /// In-flight operations are never cancelled; embedders may consult this
    /// before accepting new work.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    fn secret_store(&self) -> Result<&Arc<dyn SecretStore>> {
        self.secret_store
            .as_ref()
            .ok_or_else(|| Error::config(format!("solver {} not initialized", self.name)))
    }

    async fn prepare(&self, request: &ChallengeRequest) -> Result<Target> {
        let store = self.secret_store()?;

        let config = SolverConfig::load(request.config.as_ref())?;
        let credential =
            ProviderCredential::resolve(store.as_ref(), &config, &request.resource_namespace)
                .await?;
        let client = self
            .registry
            .create_client(&self.provider, &config.region, &credential)?;

        let zone = get_hosted_zone(client.as_ref(), &request.resolved_zone)
            .await
            .map_err(|e| Error::zone_resolution(un_fqdn(&request.resolved_zone), e))?;

        let rr = if self.options.strict_zone_match {
            try_extract_rr(&request.resolved_fqdn, &zone)?
        } else {
            extract_rr(&request.resolved_fqdn, &zone)
        };

        debug!(
            fqdn = %request.resolved_fqdn,
            zone = %zone,
            rr = %rr,
            region = %config.region,
            "Prepared challenge target"
        );

        Ok(Target { client, zone, rr })
    }

    async fn do_present(&self, request: &ChallengeRequest) -> Result<()> {
        let target = self.prepare(request).await?;

        let record_id = target
            .client
            .add_txt_record(&target.zone, &target.rr, &request.key)
            .await?;

        info!(
            fqdn = %request.resolved_fqdn,
            zone = %target.zone,
            rr = %target.rr,
            record_id = %record_id,
            "Presented challenge record"
        );
        Ok(())
    }

    async fn do_clean_up(&self, request: &ChallengeRequest) -> Result<()> {
        let target = self.prepare(request).await?;

        let records = target
            .client
            .describe_txt_records(&target.zone, &target.rr)
            .await?;

        // The provider filters by keyword; only exact names belong to us
        let candidates: Vec<_> = records.into_iter().filter(|r| r.rr == target.rr).collect();
        if candidates.is_empty() {
            return Err(Error::record_not_found(&target.rr, &target.zone));
        }

        let Some(record) = candidates.iter().find(|r| r.value == request.key) else {
            warn!(
                fqdn = %request.resolved_fqdn,
                records = candidates.len(),
                "No TXT record carries this challenge key, leaving records in place"
            );
            return Err(Error::value_mismatch(&request.resolved_fqdn));
        };

        target.client.delete_record(&record.record_id).await?;

        info!(
            fqdn = %request.resolved_fqdn,
            zone = %target.zone,
            rr = %target.rr,
            record_id = %record.record_id,
            "Cleaned up challenge record"
        );
        Ok(())
    }
}

#[async_trait]
impl Solver for Dns01Solver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&mut self, config: HostConfig, shutdown: ShutdownSignal) -> Result<()> {
        config.validate()?;

        let store = self
            .registry
            .create_secret_store(&config.secret_store)
            .await?;

        info!(
            solver = %self.name,
            provider = %self.provider,
            secret_store = store.store_name(),
            "Solver initialized"
        );

        self.secret_store = Some(Arc::from(store));
        self.shutdown = Some(shutdown);
        Ok(())
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<()> {
        self.do_present(request)
            .await
            .map_err(|e| e.in_challenge(Operation::Present, &request.resolved_fqdn))
    }

    async fn clean_up(&self, request: &ChallengeRequest) -> Result<()> {
        self.do_clean_up(request)
            .await
            .map_err(|e| e.in_challenge(Operation::CleanUp, &request.resolved_fqdn))
    }
}
