use crate::api::routes;
use dns01_core::{ShutdownSignal, Solver};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub group_name: Arc<str>,
    pub solvers: Arc<HashMap<String, Arc<dyn Solver>>>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        group_name: impl Into<Arc<str>>,
        solvers: Vec<Arc<dyn Solver>>,
        request_timeout: Duration,
    ) -> Self {
        let solvers = solvers
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        Self {
            group_name: group_name.into(),
            solvers: Arc::new(solvers),
            request_timeout,
        }
    }
}

/// Bind `addr` and build the server future
///
/// The future resolves once `shutdown` flips to `true` and in-flight
/// requests have drained. Returns the bound address alongside it.
pub(crate) fn new(
    addr: SocketAddr,
    state: AppState,
    mut shutdown: ShutdownSignal,
) -> anyhow::Result<(SocketAddr, impl Future<Output = anyhow::Result<()>>)> {
    let server = axum::Server::try_bind(&addr)?.serve(routes::new(state).into_make_service());
    let local_addr = server.local_addr();

    let server = server.with_graceful_shutdown(async move {
        let _ = shutdown.wait_for(|stop| *stop).await;
    });

    Ok((local_addr, async move {
        server.await?;
        Ok(())
    }))
}
