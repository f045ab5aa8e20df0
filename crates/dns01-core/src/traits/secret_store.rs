// # Secret Store Trait
//
// Defines the interface for resolving provider credentials out of a
// namespaced key/value secret store.
//
// ## Purpose
//
// Challenge configuration never carries credentials directly. It names two
// secret keys (`SecretKeySelector`), and the solver reads the raw bytes from
// the store scoped to the request's namespace.
//
// ## Implementations
//
// - Memory: `secrets::MemorySecretStore`
// - File: `secrets::FileSecretStore` (mounted secret directories)

use async_trait::async_trait;
use std::collections::HashMap;

/// Raw secret contents: key -> bytes
pub type SecretData = HashMap<String, Vec<u8>>;

/// A named secret in a namespace
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret {
    /// Secret name
    pub name: String,
    /// Key/value contents
    pub data: SecretData,
}

impl Secret {
    /// Create an empty secret
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: SecretData::new(),
        }
    }

    /// Add a key to the secret
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }
}

// Values are credentials, so only key names are printed.
impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.data.keys().collect();
        keys.sort();
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("keys", &keys)
            .finish()
    }
}

/// Trait for secret store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks;
/// concurrent challenges resolve their credentials independently.
///
/// # Caching
///
/// Stores should read through to their backing storage on every call so
/// rotated credentials take effect for the next challenge.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret by namespace and name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Secret))`: The secret exists
    /// - `Ok(None)`: No such secret in the namespace
    /// - `Err(Error)`: Storage error
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, crate::Error>;

    /// Store type name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing secret stores from configuration
#[async_trait]
pub trait SecretStoreFactory: Send + Sync {
    /// Create a SecretStore instance from its JSON configuration
    ///
    /// # Parameters
    ///
    /// - `config`: The serialized [`SecretStoreConfig`](crate::config::SecretStoreConfig)
    async fn create(
        &self,
        config: &serde_json::Value,
    ) -> Result<Box<dyn SecretStore>, crate::Error>;
}
