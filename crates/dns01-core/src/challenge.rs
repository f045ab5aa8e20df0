//! Challenge requests handed to the solver by the host
//!
//! The field names follow the webhook wire format (`resolvedFQDN`,
//! `resolvedZone`, `resourceNamespace`, ...), so a request body can be
//! deserialized straight into [`ChallengeRequest`].

use serde::{Deserialize, Serialize};

/// Which lifecycle step the host is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    /// Publish the TXT record
    Present,
    /// Remove the TXT record
    CleanUp,
}

/// A single DNS-01 validation attempt
///
/// Created by the host per attempt and consumed once per Present/CleanUp
/// call. The solver never stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Host-assigned request identifier, echoed in responses
    #[serde(default)]
    pub uid: String,

    /// Requested lifecycle step, when sent in a webhook envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ChallengeAction>,

    /// Challenge type, `dns-01` in practice
    #[serde(rename = "type", default)]
    pub challenge_type: String,

    /// Domain name being validated (without the `_acme-challenge` label)
    #[serde(default)]
    pub dns_name: String,

    /// Expected TXT record value
    pub key: String,

    /// Namespace that scopes secret lookup
    #[serde(default)]
    pub resource_namespace: String,

    /// Fully-qualified challenge name, e.g. `_acme-challenge.example.com.`
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,

    /// Zone the host believes owns the name, e.g. `example.com.`
    pub resolved_zone: String,

    /// Whether ambient (process-level) credentials may be used
    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Opaque per-request provider configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl ChallengeRequest {
    /// Create a request from the three fields every challenge carries
    pub fn new(
        resolved_fqdn: impl Into<String>,
        resolved_zone: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            resolved_fqdn: resolved_fqdn.into(),
            resolved_zone: resolved_zone.into(),
            key: key.into(),
            challenge_type: "dns-01".to_string(),
            ..Self::default()
        }
    }

    /// Set the namespace used for secret lookup
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.resource_namespace = namespace.into();
        self
    }

    /// Set the per-request provider configuration
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the host-assigned request identifier
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }
}
