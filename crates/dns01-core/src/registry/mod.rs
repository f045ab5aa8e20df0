//! Plugin-based provider registry
//!
//! The registry lets DNS API clients and secret stores be registered at
//! runtime, so the solver never hardcodes a provider.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dns01_core::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//!
//! // Provider crates register themselves
//! dns01_provider_alidns::register(&registry);
//! dns01_core::secrets::register_builtin(&registry);
//!
//! // Build a client for one challenge
//! let client = registry.create_client("alidns", "cn-hangzhou", &credential)?;
//! ```

use crate::config::SecretStoreConfig;
use crate::credential::ProviderCredential;
use crate::error::{Error, Result};
use crate::traits::{DnsClient, DnsClientFactory, SecretStore, SecretStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of DNS client and secret store factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes. Factories are stored behind `Arc` so a lookup
/// can release the lock before building anything.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS client factories
    clients: RwLock<HashMap<String, Arc<dyn DnsClientFactory>>>,

    /// Registered secret store factories
    secret_stores: RwLock<HashMap<String, Arc<dyn SecretStoreFactory>>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("clients", &self.list_clients())
            .field("secret_stores", &self.list_secret_stores())
            .finish()
    }
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS client factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "alidns")
    /// - `factory`: Factory object for creating client instances
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_client(&self, name: impl Into<String>, factory: Box<dyn DnsClientFactory>) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        clients.insert(name.into(), Arc::from(factory));
    }

    /// Register a secret store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Secret store type name (e.g., "file", "memory")
    /// - `factory`: Factory object for creating store instances
    pub fn register_secret_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn SecretStoreFactory>,
    ) {
        let mut stores = self
            .secret_stores
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        stores.insert(name.into(), Arc::from(factory));
    }

    /// Create a DNS client for one challenge
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsClient>)`: Client bound to `region` and `credential`
    /// - `Err(Error::Config)`: Provider type is not registered
    /// - `Err(Error::ClientConstruction)`: The factory rejected its inputs
    pub fn create_client(
        &self,
        provider: &str,
        region: &str,
        credential: &ProviderCredential,
    ) -> Result<Box<dyn DnsClient>> {
        let factory = {
            let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
            clients
                .get(provider)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider)))?
        };

        factory.create(region, credential)
    }

    /// Create a secret store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn SecretStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_secret_store(
        &self,
        config: &SecretStoreConfig,
    ) -> Result<Box<dyn SecretStore>> {
        let store_type = config.type_name();

        let factory = {
            let stores = self
                .secret_stores
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown secret store type: {}", store_type)))?
        };

        let config_json = match config {
            SecretStoreConfig::Custom { config, .. } => config.clone(),
            other => serde_json::to_value(other)?,
        };

        factory.create(&config_json).await
    }

    /// List all registered provider types
    pub fn list_clients(&self) -> Vec<String> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = clients.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all registered secret store types
    pub fn list_secret_stores(&self) -> Vec<String> {
        let stores = self
            .secret_stores
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_client(&self, name: &str) -> bool {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        clients.contains_key(name)
    }

    /// Check if a secret store type is registered
    pub fn has_secret_store(&self, name: &str) -> bool {
        let stores = self
            .secret_stores
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        stores.contains_key(name)
    }
}
