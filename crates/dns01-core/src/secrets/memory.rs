// # Memory Secret Store
//
// In-memory implementation of SecretStore.
//
// ## Purpose
//
// Holds secrets populated by the embedding process. Used by tests and by
// hosts that resolve credentials themselves before handing them over.
//
// ## Lifetime
//
// - Contents are lost on restart
// - A store created from configuration starts empty

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::secret_store::{Secret, SecretStore, SecretStoreFactory};

/// In-memory secret store
///
/// Clones share the same underlying map, so a handle kept by the embedder
/// can keep populating a store already given to a solver.
///
/// # Example
///
/// ```rust,no_run
/// use dns01_core::secrets::MemorySecretStore;
/// use dns01_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySecretStore::new();
///     store.insert("cert-manager", "alidns-secret", "access-key", "LTAI...").await;
///
///     let secret = store.get_secret("cert-manager", "alidns-secret").await?;
///     assert!(secret.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<(String, String), Secret>>>,
}

impl MemorySecretStore {
    /// Create a new empty memory secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one key of a secret, creating the secret if needed
    pub async fn insert(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) {
        let name = name.into();
        let mut guard = self.inner.write().await;
        guard
            .entry((namespace.into(), name.clone()))
            .or_insert_with(|| Secret::new(name))
            .data
            .insert(key.into(), value.into());
    }

    /// Replace a whole secret
    pub async fn put_secret(&self, namespace: impl Into<String>, secret: Secret) {
        let mut guard = self.inner.write().await;
        guard.insert((namespace.into(), secret.name.clone()), secret);
    }

    /// Remove a secret, returning it if present
    pub async fn remove_secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        let mut guard = self.inner.write().await;
        guard.remove(&(namespace.to_string(), name.to_string()))
    }

    /// Number of secrets held
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for [`MemorySecretStore`]
///
/// The default factory builds empty stores. A [`shared`](Self::shared)
/// factory hands out handles to one store the embedder keeps populating.
#[derive(Debug, Default)]
pub struct MemorySecretStoreFactory {
    shared: Option<MemorySecretStore>,
}

impl MemorySecretStoreFactory {
    /// Factory whose stores are handles to `store`
    pub fn shared(store: MemorySecretStore) -> Self {
        Self {
            shared: Some(store),
        }
    }
}

#[async_trait]
impl SecretStoreFactory for MemorySecretStoreFactory {
    async fn create(&self, _config: &serde_json::Value) -> Result<Box<dyn SecretStore>, Error> {
        Ok(Box::new(self.shared.clone().unwrap_or_default()))
    }
}
