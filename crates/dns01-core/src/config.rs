//! Configuration types for the DNS-01 solver
//!
//! Two kinds of configuration exist:
//!
//! - [`SolverConfig`]: decoded from the opaque JSON blob on every challenge
//!   request. Names the provider region and the secret keys holding the
//!   access key pair.
//! - [`HostConfig`]: handed to [`Solver::initialize`](crate::Solver::initialize)
//!   once at process start. Describes where secrets live.

use serde::{Deserialize, Serialize};

/// Reference to one key inside a named secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret name
    #[serde(default)]
    pub name: String,
    /// Key within the secret
    #[serde(default)]
    pub key: String,
}

impl SecretKeySelector {
    /// Create a selector
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Per-request solver configuration
///
/// ```json
/// {
///   "region": "cn-hangzhou",
///   "accessKeySecretRef": { "name": "alidns-secret", "key": "access-key" },
///   "secretKeySecretRef": { "name": "alidns-secret", "key": "secret-key" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Provider region; providers fall back to their default when empty
    #[serde(default)]
    pub region: String,

    /// Secret key holding the access key id
    #[serde(default)]
    pub access_key_secret_ref: SecretKeySelector,

    /// Secret key holding the access key secret
    #[serde(default)]
    pub secret_key_secret_ref: SecretKeySelector,
}

impl SolverConfig {
    /// Decode the configuration carried on a challenge request
    ///
    /// A missing (or JSON `null`) configuration decodes to the default, whose
    /// empty secret references then fail at credential lookup.
    pub fn load(raw: Option<&serde_json::Value>) -> Result<Self, crate::Error> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| crate::Error::config_decode(e.to_string())),
        }
    }
}

/// Behavior switches for the solver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Fail with `ZoneMismatch` when the challenge FQDN is not inside the
    /// resolved zone, instead of using the whole FQDN as the record name
    #[serde(default)]
    pub strict_zone_match: bool,
}

/// Process-level configuration given to the solver at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Where credential secrets are read from
    #[serde(default)]
    pub secret_store: SecretStoreConfig,
}

impl HostConfig {
    /// Create a host configuration for the given secret store
    pub fn new(secret_store: SecretStoreConfig) -> Self {
        Self { secret_store }
    }

    /// Validate the host configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.secret_store.validate()
    }
}

/// Secret store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretStoreConfig {
    /// Directory of mounted secrets: `<path>/<namespace>/<name>/<key>`
    File {
        /// Root directory
        path: String,
    },

    /// In-memory secrets (empty until populated by the embedder)
    #[default]
    Memory,

    /// Custom secret store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SecretStoreConfig {
    /// Validate the secret store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SecretStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File secret store path cannot be empty"));
                }
                Ok(())
            }
            SecretStoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom secret store factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom secret store config cannot be null",
                    ));
                }
                Ok(())
            }
            SecretStoreConfig::Memory => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            SecretStoreConfig::File { .. } => "file",
            SecretStoreConfig::Memory => "memory",
            SecretStoreConfig::Custom { factory, .. } => factory,
        }
    }
}
