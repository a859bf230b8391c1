// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - signal handling and graceful shutdown

use super::*;
use std::time::Duration;
use tokio::time::timeout;

/// Test that SIGTERM signal handler can be created on Unix platforms
#[tokio::test]
#[cfg(unix)]
async fn test_sigterm_signal_handler_creation() {
    use tokio::signal::unix::{signal, SignalKind};

    let result = signal(SignalKind::terminate());
    assert!(
        result.is_ok(),
        "Should be able to create SIGTERM signal handler"
    );
}

#[test]
fn test_json_log_format_selection() {
    assert_eq!(ENV_LOG_FORMAT, "RUST_LOG_FORMAT");
    assert!(json_log_format(Some("json")));
    assert!(json_log_format(Some("JSON")));
    assert!(!json_log_format(Some("text")));
    assert!(!json_log_format(None));
}

/// Without a signal the shutdown future stays pending
#[tokio::test]
async fn test_shutdown_signal_pending_without_signal() {
    let result = timeout(Duration::from_millis(100), shutdown_signal()).await;
    assert!(
        result.is_err(),
        "shutdown_signal() should not resolve when no signal is sent"
    );
}

/// A reconciliation loop with an immediate shutdown exits cleanly
#[tokio::test]
async fn test_reconciler_stops_on_shutdown_future() {
    use swarmflare::domains::{DomainConfig, DomainTable};
    use swarmflare::orchestrator::ScriptedOrchestrator;

    let dns =
        CloudflareClient::new("http://127.0.0.1:9/".parse().unwrap(), Duration::from_secs(1))
            .unwrap();
    let reconciler = Reconciler::new(
        Arc::new(ScriptedOrchestrator::new(vec![])),
        Arc::new(dns),
        Arc::new(InMemoryReconciliationStore::new()),
        Arc::new(DomainTable::new([(
            "example.com",
            DomainConfig::new("zone", "token"),
        )])),
    );

    let result = timeout(
        Duration::from_secs(1),
        reconciler.run_until(std::future::ready(())),
    )
    .await
    .expect("run_until should return promptly");
    assert!(result.is_ok());
}
