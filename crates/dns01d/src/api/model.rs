use dns01_core::{ChallengeRequest, Error};
use serde::{Deserialize, Serialize};

pub(crate) const API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";
pub(crate) const KIND: &str = "ChallengePayload";

/// Envelope exchanged with the host in both directions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChallengePayload {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl ChallengePayload {
    /// Reply envelope carrying `response`, echoing the request's version and kind
    pub fn reply(api_version: String, kind: String, response: ChallengeResponse) -> Self {
        Self {
            api_version,
            kind,
            request: None,
            response: Some(response),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Failure details in the shape of an API status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Status {
    pub message: String,
    pub reason: String,
    pub code: u16,
}

impl ChallengeResponse {
    pub fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    pub fn failure(uid: &str, err: &Error) -> Self {
        let (reason, code) = match err.root_cause() {
            Error::ConfigDecode(_) | Error::ZoneMismatch { .. } => ("BadRequest", 400),
            Error::Credential(_) | Error::ClientConstruction(_) => ("Unauthorized", 401),
            Error::ZoneNotFound { .. } | Error::RecordNotFound { .. } => ("NotFound", 404),
            Error::ValueMismatch { .. } => ("Conflict", 409),
            _ => ("InternalError", 500),
        };

        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(Status {
                message: err.to_string(),
                reason: reason.to_string(),
                code,
            }),
        }
    }
}
