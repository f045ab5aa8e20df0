//! HTTP API the host calls to solve challenges.
//!
//! # API Endpoints
//!
//! ## `/healthz` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/apis/{group}/v1alpha1/{solver}` (POST)
//!
//!   Expects a `ChallengePayload` whose `request` carries the challenge and
//!   the action to perform:
//!
//!   ```json
//!   {
//!     "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
//!     "kind": "ChallengePayload",
//!     "request": {
//!       "uid": "6d2c0d4e",
//!       "action": "Present",
//!       "key": "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
//!       "resourceNamespace": "cert-manager",
//!       "resolvedFQDN": "_acme-challenge.example.com.",
//!       "resolvedZone": "example.com.",
//!       "config": { "accessKeySecretRef": { "name": "alidns", "key": "access-key" },
//!                   "secretKeySecretRef": { "name": "alidns", "key": "secret-key" } }
//!     }
//!   }
//!   ```
//!
//!   Replies HTTP 200 (OK) with the same envelope holding a `response`:
//!
//!   ```json
//!   { "apiVersion": "...", "kind": "ChallengePayload",
//!     "response": { "uid": "6d2c0d4e", "success": false,
//!                   "status": { "message": "...", "reason": "Conflict", "code": 409 } } }
//!   ```
//!
//!   A failing solver is still a 200; `success` tells the host what happened.
//!   Unknown groups or solvers are 404, malformed payloads 400/422.

mod api_error;
mod model;
mod routes;
pub mod server;

pub(crate) use server::AppState;
