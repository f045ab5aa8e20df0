// # dns01d - DNS-01 webhook daemon
//
// A thin integration layer around dns01-core:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime and logging
// 3. Registering the alidns client and the built-in secret stores
// 4. Serving challenge requests over HTTP until SIGTERM/SIGINT
//
// All challenge logic lives in dns01-core. Configuration is via environment
// variables only; see `config.rs` for the full list.
//
// ## Example
//
// ```bash
// export GROUP_NAME=acme.example.com
// export DNS01_SECRET_STORE_PATH=/var/run/secrets/dns01
//
// dns01d
// ```

mod api;
mod config;

use anyhow::Result;
use config::Config;
use dns01_core::{ProviderRegistry, Solver};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// How long in-flight requests may take to drain after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum Dns01ExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<Dns01ExitCode> for ExitCode {
    fn from(code: Dns01ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return Dns01ExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    info!("Starting dns01d daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dns01ExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            Dns01ExitCode::RuntimeError
        } else {
            Dns01ExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: Config) -> Result<()> {
    let registry = Arc::new(ProviderRegistry::new());
    dns01_core::secrets::register_builtin(&registry);
    dns01_provider_alidns::register(&registry);
    info!(
        clients = ?registry.list_clients(),
        secret_stores = ?registry.list_secret_stores(),
        "Registered plugins"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut solver =
        dns01_provider_alidns::solver(registry.clone()).with_options(config.solver_options());
    solver
        .initialize(config.host_config(), shutdown_rx.clone())
        .await?;

    let state = api::AppState::new(
        config.group_name.as_str(),
        vec![Arc::new(solver) as Arc<dyn Solver>],
        config.request_timeout(),
    );

    let (addr, serve) = api::server::new(config.socket_addr()?, state, shutdown_rx)?;
    info!(
        %addr,
        group = %config.group_name,
        strict_zone_match = config.strict_zone_match,
        "Serving challenge requests"
    );
    let mut server = tokio::spawn(serve);

    let signal = tokio::select! {
        res = &mut server => {
            // The server only stops on its own when something broke
            res??;
            anyhow::bail!("HTTP server exited unexpectedly");
        }
        signal = wait_for_shutdown_signal() => signal?,
    };

    info!("Received shutdown signal: {}", signal);
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(res) => res??,
        Err(_) => anyhow::bail!("Shutdown timeout after {:?}", SHUTDOWN_GRACE),
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// The name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
