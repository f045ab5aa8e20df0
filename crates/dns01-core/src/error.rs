//! Error types for the DNS-01 solver
//!
//! Every failure surfaced by [`Solver::present`](crate::Solver::present) or
//! [`Solver::clean_up`](crate::Solver::clean_up) is wrapped in
//! [`Error::Challenge`], which names the operation and the challenge FQDN.
//! Use [`Error::root_cause`] to get at the condition underneath.

use thiserror::Error;

/// Result type alias for DNS-01 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle operation an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Publishing the TXT record
    Present,
    /// Retracting the TXT record
    CleanUp,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Present => f.write_str("present"),
            Operation::CleanUp => f.write_str("cleanup"),
        }
    }
}

/// Core error type for the DNS-01 solver
#[derive(Error, Debug)]
pub enum Error {
    /// The per-request solver configuration could not be decoded
    #[error("error decoding solver config: {0}")]
    ConfigDecode(String),

    /// A referenced secret or key is missing, or the secret store failed
    #[error("credential error: {0}")]
    Credential(String),

    /// The provider client could not be built
    #[error("failed to construct DNS client: {0}")]
    ClientConstruction(String),

    /// The provider has no zone with this exact name
    #[error("zone {zone} does not exist")]
    ZoneNotFound {
        /// Zone name as queried
        zone: String,
    },

    /// Looking up the owning zone failed
    #[error("failed to resolve hosted zone {zone}: {source}")]
    ZoneResolution {
        /// Zone name from the challenge request
        zone: String,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// The challenge FQDN does not end in the resolved zone
    #[error("{fqdn} is not inside zone {zone}")]
    ZoneMismatch {
        /// Normalized challenge FQDN
        fqdn: String,
        /// Canonical zone name
        zone: String,
    },

    /// No TXT record with the relative name exists
    #[error("txt record does not exist: {rr}.{zone}")]
    RecordNotFound {
        /// Relative record name
        rr: String,
        /// Canonical zone name
        zone: String,
    },

    /// TXT records exist under the name but none carries the challenge key
    #[error("record value does not match: {fqdn}")]
    ValueMismatch {
        /// Challenge FQDN
        fqdn: String,
    },

    /// A provider API call failed
    #[error("provider error ({provider}): {message}")]
    ProviderRequest {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Static configuration or wiring errors (registry, host config)
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors from secret stores
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Context wrapper for Present/CleanUp failures
    #[error("{operation} {fqdn}: {source}")]
    Challenge {
        /// Operation that failed
        operation: Operation,
        /// Challenge FQDN
        fqdn: String,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a config decode error
    pub fn config_decode(msg: impl Into<String>) -> Self {
        Self::ConfigDecode(msg.into())
    }

    /// Create a credential error
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Create a client construction error
    pub fn client_construction(msg: impl Into<String>) -> Self {
        Self::ClientConstruction(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound { zone: zone.into() }
    }

    /// Create a "record not found" error
    pub fn record_not_found(rr: impl Into<String>, zone: impl Into<String>) -> Self {
        Self::RecordNotFound {
            rr: rr.into(),
            zone: zone.into(),
        }
    }

    /// Create a value mismatch error
    pub fn value_mismatch(fqdn: impl Into<String>) -> Self {
        Self::ValueMismatch { fqdn: fqdn.into() }
    }

    /// Create a provider request error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderRequest {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a zone lookup failure
    pub fn zone_resolution(zone: impl Into<String>, source: Error) -> Self {
        Self::ZoneResolution {
            zone: zone.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a failure with the operation and challenge FQDN it belongs to
    pub fn in_challenge(self, operation: Operation, fqdn: impl Into<String>) -> Self {
        Self::Challenge {
            operation,
            fqdn: fqdn.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Challenge { source, .. } | Self::ZoneResolution { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Whether this error (or its cause) is the deliberate value-mismatch refusal
    pub fn is_value_mismatch(&self) -> bool {
        matches!(self.root_cause(), Self::ValueMismatch { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(err.to_string())
    }
}
