//! Test doubles and common utilities for solver contract tests
//!
//! [`FakeDns`] is an in-memory provider account: a list of zones and a TXT
//! record table. Every client built by [`FakeClientFactory`] talks to the
//! same account, the way per-request clients talk to one real account.

#![allow(dead_code)]

use async_trait::async_trait;
use dns01_core::config::{HostConfig, SecretStoreConfig, SolverOptions};
use dns01_core::error::{Error, Result};
use dns01_core::traits::{
    DnsClient, DnsClientFactory, SearchMode, SecretStore, SecretStoreFactory, TxtRecord, Zone,
    RECORD_TYPE_TXT,
};
use dns01_core::{ChallengeRequest, Dns01Solver, MemorySecretStore, ProviderCredential, ProviderRegistry, Solver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const NAMESPACE: &str = "cert-manager";
pub const SECRET_NAME: &str = "alidns-secret";
pub const ACCESS_KEY_ID: &str = "LTAI-test-id";
pub const ACCESS_KEY_SECRET: &str = "test-secret";

/// Provider call that should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    DescribeZones,
    AddRecord,
    DescribeRecords,
    DeleteRecord,
}

#[derive(Debug, Default)]
struct FakeState {
    zones: Vec<String>,
    records: Vec<TxtRecord>,
    next_id: u64,
    fail: Option<FailPoint>,
    last_region: Option<String>,
    record_zones: Vec<String>,
}

/// Shared in-memory provider account
#[derive(Debug, Clone, Default)]
pub struct FakeDns {
    state: Arc<Mutex<FakeState>>,
    clients_built: Arc<AtomicUsize>,
    add_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl FakeDns {
    /// Account holding the given zones
    pub fn with_zones(zones: &[&str]) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().zones = zones.iter().map(|z| z.to_string()).collect();
        fake
    }

    /// Make every subsequent call at `point` fail
    pub fn fail_at(&self, point: FailPoint) {
        self.state.lock().unwrap().fail = Some(point);
    }

    /// Insert a record directly, bypassing the solver
    pub fn seed_record(&self, rr: &str, value: &str) -> String {
        let mut state = self.state.lock().unwrap();
        Self::insert(&mut state, rr, value)
    }

    /// Snapshot of all TXT records
    pub fn records(&self) -> Vec<TxtRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Values stored under an exact relative name
    pub fn values_at(&self, rr: &str) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.rr == rr)
            .map(|r| r.value)
            .collect()
    }

    pub fn clients_built(&self) -> usize {
        self.clients_built.load(Ordering::SeqCst)
    }

    pub fn add_call_count(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn last_region(&self) -> Option<String> {
        self.state.lock().unwrap().last_region.clone()
    }

    /// Zone argument of every add/describe record call, in call order
    pub fn record_zones(&self) -> Vec<String> {
        self.state.lock().unwrap().record_zones.clone()
    }

    // Record calls only accept a registered zone name, spelled exactly
    fn use_zone(state: &mut FakeState, zone: &str) -> Result<()> {
        state.record_zones.push(zone.to_string());
        if !state.zones.iter().any(|z| z == zone) {
            return Err(Error::provider("fake", format!("unknown domain {}", zone)));
        }
        Ok(())
    }

    fn insert(state: &mut FakeState, rr: &str, value: &str) -> String {
        state.next_id += 1;
        let record_id = format!("rec-{}", state.next_id);
        state.records.push(TxtRecord {
            record_id: record_id.clone(),
            rr: rr.to_string(),
            value: value.to_string(),
            record_type: RECORD_TYPE_TXT.to_string(),
            ttl: Some(600),
        });
        record_id
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        if self.state.lock().unwrap().fail == Some(point) {
            return Err(Error::provider("fake", format!("injected failure at {:?}", point)));
        }
        Ok(())
    }
}

/// Client bound to a [`FakeDns`] account
pub struct FakeClient {
    dns: FakeDns,
}

#[async_trait]
impl DnsClient for FakeClient {
    async fn describe_zones(&self, keyword: &str, mode: SearchMode) -> Result<Vec<Zone>> {
        self.dns.check(FailPoint::DescribeZones)?;
        let state = self.dns.state.lock().unwrap();
        Ok(state
            .zones
            .iter()
            .filter(|z| match mode {
                SearchMode::Exact => z.eq_ignore_ascii_case(keyword),
                SearchMode::Like => z.contains(keyword),
            })
            .map(Zone::new)
            .collect())
    }

    async fn add_txt_record(&self, zone: &str, rr: &str, value: &str) -> Result<String> {
        self.dns.add_calls.fetch_add(1, Ordering::SeqCst);
        self.dns.check(FailPoint::AddRecord)?;
        let mut state = self.dns.state.lock().unwrap();
        FakeDns::use_zone(&mut state, zone)?;
        Ok(FakeDns::insert(&mut state, rr, value))
    }

    // Keyword match like the real API: a prefix search, not an exact one
    async fn describe_txt_records(&self, zone: &str, rr_keyword: &str) -> Result<Vec<TxtRecord>> {
        self.dns.check(FailPoint::DescribeRecords)?;
        let mut state = self.dns.state.lock().unwrap();
        FakeDns::use_zone(&mut state, zone)?;
        Ok(state
            .records
            .iter()
            .filter(|r| r.rr.starts_with(rr_keyword))
            .cloned()
            .collect())
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        self.dns.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.dns.check(FailPoint::DeleteRecord)?;
        let mut state = self.dns.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| r.record_id != record_id);
        if state.records.len() == before {
            return Err(Error::provider("fake", format!("no record {}", record_id)));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Factory handing out clients of one [`FakeDns`] account
pub struct FakeClientFactory {
    dns: FakeDns,
}

impl DnsClientFactory for FakeClientFactory {
    fn create(&self, region: &str, credential: &ProviderCredential) -> Result<Box<dyn DnsClient>> {
        if credential.access_key_id() != ACCESS_KEY_ID
            || credential.access_key_secret() != ACCESS_KEY_SECRET
        {
            return Err(Error::client_construction("unexpected credentials"));
        }
        self.dns.clients_built.fetch_add(1, Ordering::SeqCst);
        self.dns.state.lock().unwrap().last_region = Some(region.to_string());
        Ok(Box::new(FakeClient {
            dns: self.dns.clone(),
        }))
    }
}

/// Secret store factory returning a handle to a pre-populated store
struct SharedStoreFactory {
    store: MemorySecretStore,
}

#[async_trait]
impl SecretStoreFactory for SharedStoreFactory {
    async fn create(&self, _config: &serde_json::Value) -> Result<Box<dyn SecretStore>> {
        Ok(Box::new(self.store.clone()))
    }
}

/// Everything a contract test needs around one solver
pub struct Harness {
    pub solver: Dns01Solver,
    pub dns: FakeDns,
    pub secrets: MemorySecretStore,
    pub shutdown_tx: watch::Sender<bool>,
}

/// Build and initialize a solver over `dns` with valid credentials stored
pub async fn harness(dns: &FakeDns, options: SolverOptions) -> Harness {
    let secrets = MemorySecretStore::new();
    secrets
        .insert(NAMESPACE, SECRET_NAME, "access-key", ACCESS_KEY_ID)
        .await;
    secrets
        .insert(NAMESPACE, SECRET_NAME, "secret-key", ACCESS_KEY_SECRET)
        .await;

    let registry = Arc::new(ProviderRegistry::new());
    registry.register_client("fake", Box::new(FakeClientFactory { dns: dns.clone() }));
    registry.register_secret_store(
        "shared",
        Box::new(SharedStoreFactory {
            store: secrets.clone(),
        }),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut solver = Dns01Solver::new("fake-solver", "fake", registry).with_options(options);
    solver
        .initialize(
            HostConfig::new(SecretStoreConfig::Custom {
                factory: "shared".to_string(),
                config: serde_json::json!({}),
            }),
            shutdown_rx,
        )
        .await
        .expect("initialize succeeds");

    Harness {
        solver,
        dns: dns.clone(),
        secrets,
        shutdown_tx,
    }
}

/// Solver config referencing the harness credentials
pub fn solver_config() -> serde_json::Value {
    serde_json::json!({
        "region": "cn-shanghai",
        "accessKeySecretRef": { "name": SECRET_NAME, "key": "access-key" },
        "secretKeySecretRef": { "name": SECRET_NAME, "key": "secret-key" }
    })
}

/// A fully populated challenge request
pub fn challenge(fqdn: &str, zone: &str, key: &str) -> ChallengeRequest {
    ChallengeRequest::new(fqdn, zone, key)
        .with_namespace(NAMESPACE)
        .with_config(solver_config())
}
