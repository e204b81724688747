//! Server lifecycle
//!
//! Builds the proxy from configuration, serves it, and drains in-flight
//! requests on shutdown. Requests still waiting out an injected delay are
//! aborted as soon as shutdown begins.

use std::{sync::Arc, time::Duration};

use application::FaultStats;
use infrastructure::{AppConfig, ReqwestTransport};
use tokio::{net::TcpListener, signal, task::JoinHandle};
use tracing::{info, warn};

use crate::{proxy::ReverseProxy, routes::create_app, state::AppState};

/// Build the application state from configuration
///
/// # Errors
///
/// Fails on an invalid fault configuration (e.g. a bad destination) or if
/// the HTTP client cannot be created.
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let fault_config = config.fault_config()?;
    let transport = ReqwestTransport::with_config(config.upstream.to_transport_config())?;

    info!(config = %fault_config, "Fault injection configured");

    let proxy = ReverseProxy::assemble(fault_config, Arc::new(transport));
    Ok(AppState::new(proxy).with_max_body_bytes(config.server.max_body_bytes))
}

/// Serve the proxy until Ctrl+C or SIGTERM
///
/// Returns the fault statistics accumulated over the server's lifetime.
pub async fn serve(config: &AppConfig) -> anyhow::Result<FaultStats> {
    let state = build_state(config)?;

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        destination = %state.proxy.destination(),
        "Proxy listening on http://{}", addr
    );

    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    serve_until(listener, state, config.server.shutdown_timeout()).await
}

/// Serve on `listener` until `state.shutdown` is cancelled
///
/// After cancellation, open requests get up to `grace` to finish (forever
/// if `None`) before their connections are abandoned.
pub async fn serve_until(
    listener: TcpListener,
    state: AppState,
    grace: Option<Duration>,
) -> anyhow::Result<FaultStats> {
    let shutdown = state.shutdown.clone();
    let transport = Arc::clone(state.proxy.transport());
    let app = create_app(state);

    let token = shutdown.clone();
    let mut server: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    });

    tokio::select! {
        joined = &mut server => joined??,
        () = shutdown.cancelled() => drain(server, grace).await?,
    }

    let stats = transport.stats();
    info!(
        total = stats.total_requests,
        forwarded = stats.forwarded,
        dropped = stats.dropped,
        forward_failures = stats.forward_failures,
        cancelled = stats.cancelled,
        injected_delay_ms = stats.injected_delay_ms,
        "Proxy stopped"
    );
    Ok(stats)
}

async fn drain(
    mut server: JoinHandle<std::io::Result<()>>,
    grace: Option<Duration>,
) -> anyhow::Result<()> {
    let Some(grace) = grace else {
        return Ok(server.await??);
    };

    info!("Waiting up to {:?} for connections to close", grace);
    if let Ok(joined) = tokio::time::timeout(grace, &mut server).await {
        joined??;
    } else {
        warn!("Shutdown grace period elapsed, closing remaining connections");
        server.abort();
    }
    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
