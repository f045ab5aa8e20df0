//! Provider credentials resolved from the secret store
//!
//! A [`ProviderCredential`] is built fresh for every challenge request from
//! the two secret references in its [`SolverConfig`]. Nothing here is cached.

use crate::config::{SecretKeySelector, SolverConfig};
use crate::error::{Error, Result};
use crate::traits::SecretStore;

/// Access key pair used to sign provider API calls
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    access_key_id: String,
    /// ⚠️ NEVER log this value
    access_key_secret: String,
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .finish()
    }
}

impl ProviderCredential {
    /// Create a credential from an access key pair
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    /// The access key id
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The access key secret
    pub fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    /// Resolve both halves of the key pair from `store`, scoped to `namespace`
    pub async fn resolve(
        store: &dyn SecretStore,
        config: &SolverConfig,
        namespace: &str,
    ) -> Result<Self> {
        let access_key = resolve_secret_key(store, &config.access_key_secret_ref, namespace).await?;
        let secret_key = resolve_secret_key(store, &config.secret_key_secret_ref, namespace).await?;

        Ok(Self::new(
            into_utf8(access_key, &config.access_key_secret_ref, namespace)?,
            into_utf8(secret_key, &config.secret_key_secret_ref, namespace)?,
        ))
    }
}

/// Read the raw bytes behind one secret key
///
/// Fails with [`Error::Credential`] when the secret or the key is absent.
pub async fn resolve_secret_key(
    store: &dyn SecretStore,
    selector: &SecretKeySelector,
    namespace: &str,
) -> Result<Vec<u8>> {
    let qualified = format!("{}/{}", namespace, selector.name);

    if selector.name.is_empty() {
        return Err(Error::credential(format!(
            "no secret name configured for key {:?}",
            selector.key
        )));
    }

    let secret = store
        .get_secret(namespace, &selector.name)
        .await
        .map_err(|e| Error::credential(format!("failed to load secret {:?}: {}", qualified, e)))?
        .ok_or_else(|| Error::credential(format!("secret {:?} not found", qualified)))?;

    secret
        .get(&selector.key)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| {
            Error::credential(format!(
                "no key {:?} in secret {:?}",
                selector.key, qualified
            ))
        })
}

fn into_utf8(bytes: Vec<u8>, selector: &SecretKeySelector, namespace: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| {
        Error::credential(format!(
            "key {:?} in secret \"{}/{}\" is not valid UTF-8",
            selector.key, namespace, selector.name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    fn config() -> SolverConfig {
        SolverConfig {
            region: String::new(),
            access_key_secret_ref: SecretKeySelector::new("alidns-secret", "access-key"),
            secret_key_secret_ref: SecretKeySelector::new("alidns-secret", "secret-key"),
        }
    }

    #[tokio::test]
    async fn test_resolve_credential() {
        let store = MemorySecretStore::new();
        store.insert("cert-manager", "alidns-secret", "access-key", "LTAI-id").await;
        store.insert("cert-manager", "alidns-secret", "secret-key", "s3cr3t").await;

        let cred = ProviderCredential::resolve(&store, &config(), "cert-manager")
            .await
            .unwrap();
        assert_eq!(cred.access_key_id(), "LTAI-id");
        assert_eq!(cred.access_key_secret(), "s3cr3t");
    }

    #[tokio::test]
    async fn test_missing_secret_and_key() {
        let store = MemorySecretStore::new();

        let err = ProviderCredential::resolve(&store, &config(), "cert-manager")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
        assert!(err.to_string().contains("cert-manager/alidns-secret"));

        store.insert("cert-manager", "alidns-secret", "access-key", "LTAI-id").await;
        let err = ProviderCredential::resolve(&store, &config(), "cert-manager")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no key \"secret-key\""));
    }

    #[tokio::test]
    async fn test_secret_is_namespace_scoped() {
        let store = MemorySecretStore::new();
        store.insert("team-a", "alidns-secret", "access-key", "LTAI-id").await;
        store.insert("team-a", "alidns-secret", "secret-key", "s3cr3t").await;

        let result = ProviderCredential::resolve(&store, &config(), "team-b").await;
        assert!(matches!(result, Err(Error::Credential(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_reference() {
        let store = MemorySecretStore::new();
        let result = ProviderCredential::resolve(&store, &SolverConfig::default(), "default").await;
        assert!(matches!(result, Err(Error::Credential(_))));
    }

    #[test]
    fn test_secret_not_exposed_in_debug() {
        let cred = ProviderCredential::new("LTAI-id", "secret_value_12345");
        let debug_str = format!("{:?}", cred);
        assert!(debug_str.contains("LTAI-id"));
        assert!(!debug_str.contains("secret_value_12345"));
    }
}
