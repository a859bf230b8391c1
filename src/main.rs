// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use std::sync::Arc;
use swarmflare::{
    cloudflare::CloudflareClient,
    config::Config,
    constants::{ENV_LOG_FORMAT, RUNTIME_THREAD_NAME, TOKIO_WORKER_THREADS},
    metrics,
    orchestrator::DockerOrchestrator,
    reconciler::Reconciler,
    state::InMemoryReconciliationStore,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(RUNTIME_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging.
///
/// `RUST_LOG` sets the filter (default `info`); `RUST_LOG_FORMAT=json`
/// switches from compact text to JSON lines.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_target(false);

    if json_log_format(std::env::var(ENV_LOG_FORMAT).ok().as_deref()) {
        builder.json().init();
    } else {
        builder.with_ansi(true).compact().init();
    }
}

/// True when the `RUST_LOG_FORMAT` value asks for JSON lines.
fn json_log_format(value: Option<&str>) -> bool {
    value.is_some_and(|format| format.eq_ignore_ascii_case("json"))
}

async fn async_main() -> Result<()> {
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting swarmflare");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration, exiting");
            return Err(e.into());
        }
    };
    debug!(
        domains = ?config.domains.domains().collect::<Vec<_>>(),
        docker_host = %config.docker_host,
        cloudflare_api_url = %config.cloudflare_api_url,
        "Configuration loaded"
    );

    if config.public_address_unset() {
        warn!("Neither PUBLIC_IP nor SWARM_PUBLIC_IP is set, missing records will not be created");
    } else {
        info!(public_address = %config.public_address, "Using public address");
    }

    let orchestrator = DockerOrchestrator::new(
        config.docker_host.clone(),
        config.http_timeout,
        config.public_address,
    )
    .context("Failed to create Docker client")?;
    orchestrator.warn_if_not_swarm().await;

    let dns = CloudflareClient::new(config.cloudflare_api_url.clone(), config.http_timeout)
        .context("Failed to create Cloudflare client")?;

    if let Some(addr) = config.metrics_bind_address {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {addr}"))?;
        tokio::spawn(async move {
            if let Err(e) = metrics::serve_metrics(listener).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let reconciler = Reconciler::new(
        Arc::new(orchestrator),
        Arc::new(dns),
        Arc::new(InMemoryReconciliationStore::new()),
        Arc::new(config.domains),
    )
    .with_resync_interval(config.check_interval);

    match reconciler.run_until(shutdown_signal()).await {
        Ok(()) => {
            info!("swarmflare stopped");
            Ok(())
        }
        Err(e) => {
            error!(
                reason = e.status_reason(),
                error = %e,
                "CRITICAL: reconciliation loop exited"
            );
            Err(e.into())
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
