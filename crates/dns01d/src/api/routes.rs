use crate::api::api_error::{APIError, RouteError};
use crate::api::model::{ChallengePayload, ChallengeResponse};
use crate::api::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use dns01_core::ChallengeAction;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/apis/:group/v1alpha1/:solver", post(solve))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.request_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn solve(
    State(state): State<AppState>,
    Path((group, solver_name)): Path<(String, String)>,
    payload: Result<Json<ChallengePayload>, JsonRejection>,
) -> Result<Json<ChallengePayload>, APIError> {
    let Json(payload) = payload.map_err(RouteError::from)?;

    if group != *state.group_name {
        return Err(RouteError::UnknownGroup(group).into());
    }
    let solver = state
        .solvers
        .get(&solver_name)
        .cloned()
        .ok_or(RouteError::UnknownSolver(solver_name))?;

    let request = payload.request.ok_or(RouteError::MissingRequest)?;
    let action = request.action.ok_or(RouteError::MissingAction)?;

    tracing::info!(
        uid = %request.uid,
        action = ?action,
        fqdn = %request.resolved_fqdn,
        solver = solver.name(),
        "handling challenge"
    );

    let result = match action {
        ChallengeAction::Present => solver.present(&request).await,
        ChallengeAction::CleanUp => solver.clean_up(&request).await,
    };

    let response = match result {
        Ok(()) => ChallengeResponse::success(&request.uid),
        Err(err) => {
            tracing::warn!(uid = %request.uid, "challenge failed: {err}");
            ChallengeResponse::failure(&request.uid, &err)
        }
    };

    Ok(Json(ChallengePayload::reply(
        payload.api_version,
        payload.kind,
        response,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::{API_VERSION, KIND};
    use crate::api::server;
    use async_trait::async_trait;
    use dns01_core::{ChallengeRequest, Error, HostConfig, ShutdownSignal, Solver};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Solver double: succeeds unless the key is "fail"
    #[derive(Default)]
    struct StubSolver {
        presents: AtomicUsize,
        clean_ups: AtomicUsize,
    }

    #[async_trait]
    impl Solver for StubSolver {
        fn name(&self) -> &str {
            "alidns"
        }

        async fn initialize(&mut self, _: HostConfig, _: ShutdownSignal) -> dns01_core::Result<()> {
            Ok(())
        }

        async fn present(&self, request: &ChallengeRequest) -> dns01_core::Result<()> {
            self.presents.fetch_add(1, Ordering::SeqCst);
            if request.key == "fail" {
                return Err(Error::zone_not_found("example.com"));
            }
            Ok(())
        }

        async fn clean_up(&self, request: &ChallengeRequest) -> dns01_core::Result<()> {
            self.clean_ups.fetch_add(1, Ordering::SeqCst);
            if request.key == "fail" {
                return Err(Error::value_mismatch(&request.resolved_fqdn));
            }
            Ok(())
        }
    }

    fn state(solver: Arc<StubSolver>) -> AppState {
        AppState::new("acme.example.com", vec![solver as Arc<dyn Solver>], Duration::from_secs(5))
    }

    fn payload(action: ChallengeAction, key: &str) -> ChallengePayload {
        let mut request = ChallengeRequest::new("_acme-challenge.example.com.", "example.com.", key)
            .with_uid("u-1");
        request.action = Some(action);
        ChallengePayload {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            request: Some(request),
            response: None,
        }
    }

    async fn call(
        state: AppState,
        group: &str,
        solver: &str,
        body: ChallengePayload,
    ) -> Result<ChallengePayload, APIError> {
        solve(
            State(state),
            Path((group.to_string(), solver.to_string())),
            Ok(Json(body)),
        )
        .await
        .map(|Json(reply)| reply)
    }

    #[tokio::test]
    async fn test_present_dispatch() {
        let solver = Arc::new(StubSolver::default());
        let reply = call(
            state(solver.clone()),
            "acme.example.com",
            "alidns",
            payload(ChallengeAction::Present, "token-1"),
        )
        .await
        .ok()
        .unwrap();

        let response = reply.response.unwrap();
        assert!(response.success);
        assert_eq!(response.uid, "u-1");
        assert_eq!(solver.presents.load(Ordering::SeqCst), 1);
        assert_eq!(solver.clean_ups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_solver_failure_is_reported_in_envelope() {
        let solver = Arc::new(StubSolver::default());
        let reply = call(
            state(solver.clone()),
            "acme.example.com",
            "alidns",
            payload(ChallengeAction::CleanUp, "fail"),
        )
        .await
        .ok()
        .unwrap();

        let response = reply.response.unwrap();
        assert!(!response.success);
        assert_eq!(response.status.unwrap().reason, "Conflict");
        assert_eq!(solver.clean_ups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_group_and_solver() {
        let solver = Arc::new(StubSolver::default());

        let err = call(state(solver.clone()), "other.example.com", "alidns", payload(ChallengeAction::Present, "k"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), axum::http::StatusCode::NOT_FOUND);

        let err = call(state(solver.clone()), "acme.example.com", "route53", payload(ChallengeAction::Present, "k"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), axum::http::StatusCode::NOT_FOUND);

        assert_eq!(solver.presents.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_action_is_bad_request() {
        let solver = Arc::new(StubSolver::default());
        let mut body = payload(ChallengeAction::Present, "k");
        if let Some(request) = body.request.as_mut() {
            request.action = None;
        }

        let err = call(state(solver), "acme.example.com", "alidns", body)
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_served_over_http() {
        let solver = Arc::new(StubSolver::default());
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let (addr, serve) = server::new(
            "127.0.0.1:0".parse().unwrap(),
            state(solver.clone()),
            shutdown_rx,
        )
        .unwrap();
        let handle = tokio::spawn(serve);

        let client = reqwest::Client::new();
        let health: serde_json::Value = client
            .get(format!("http://{addr}/healthz"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health, json!({"ok":"healthy"}));

        let resp = client
            .post(format!("http://{addr}/apis/acme.example.com/v1alpha1/alidns"))
            .json(&payload(ChallengeAction::Present, "token-1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let reply: ChallengePayload = resp.json().await.unwrap();
        assert!(reply.response.unwrap().success);

        let resp = client
            .post(format!("http://{addr}/apis/acme.example.com/v1alpha1/alidns"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }
}
