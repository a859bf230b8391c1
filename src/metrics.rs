// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the DNS reconciler.
//!
//! All metrics use the `swarmflare_` prefix and live in [`METRICS_REGISTRY`].
//! When `METRICS_BIND_ADDRESS` is set, [`serve_metrics`] exposes them on
//! `/metrics` next to a `/healthz` probe.
//!
//! # Metrics Categories
//!
//! - **Event Metrics** - Workload events received, by action
//! - **Reconciliation Metrics** - Per-workload outcomes and duration
//! - **DNS Metrics** - Record lookups and creations
//! - **Error Metrics** - Failures by component and reason code
//!
//! # Example
//!
//! ```rust,no_run
//! use swarmflare::metrics::{gather_metrics, record_reconciliation_success};
//!
//! record_reconciliation_success("event", std::time::Duration::from_millis(40));
//! let text = gather_metrics().unwrap();
//! assert!(text.contains("swarmflare_reconciliations_total"));
//! ```

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "swarmflare";

/// Content type of the Prometheus text exposition format
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Event Metrics
// ============================================================================

/// Total number of workload events received
///
/// Labels:
/// - `action`: `create`, `update` or `remove`
pub static EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_events_total"),
        "Total number of workload events received by action",
    );
    let counter = CounterVec::new(opts, &["action"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of workload reconciliations
///
/// Labels:
/// - `trigger`: `initial`, `event` or `resync`
/// - `status`: `success` or `error`
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of workload reconciliations by trigger and status",
    );
    let counter = CounterVec::new(opts, &["trigger", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of workload reconciliations in seconds
///
/// Labels:
/// - `trigger`: `initial`, `event` or `resync`
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of workload reconciliations in seconds by trigger",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["trigger"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Decisions taken per routing rule
///
/// Labels:
/// - `outcome`: e.g. `created`, `record_exists`, `no_domain_config`
pub static RULE_OUTCOMES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rule_outcomes_total"),
        "Total number of routing rule decisions by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// DNS Metrics
// ============================================================================

/// Total number of DNS record lookups
///
/// Labels:
/// - `result`: `found` or `absent`
pub static DNS_LOOKUPS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_dns_lookups_total"),
        "Total number of DNS record lookups by result",
    );
    let counter = CounterVec::new(opts, &["result"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of DNS record creation attempts
///
/// Labels:
/// - `status`: `success` or `failure`
pub static DNS_RECORDS_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_dns_records_created_total"),
        "Total number of DNS record creation attempts by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors
///
/// Labels:
/// - `component`: `cloudflare`, `orchestrator` or `reconciler`
/// - `reason`: reason code from [`crate::status_reasons`]
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by component and reason",
    );
    let counter = CounterVec::new(opts, &["component", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a workload event.
pub fn record_event(action: &str) {
    EVENTS_TOTAL.with_label_values(&[action]).inc();
}

/// Record a completed workload reconciliation
///
/// # Arguments
/// * `trigger` - What started it (`initial`, `event`, `resync`)
/// * `duration` - Time spent on the workload
pub fn record_reconciliation_success(trigger: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[trigger, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[trigger])
        .observe(duration.as_secs_f64());
}

/// Record a workload reconciliation that failed before completing
pub fn record_reconciliation_error(trigger: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[trigger, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[trigger])
        .observe(duration.as_secs_f64());
}

pub fn record_rule_outcome(outcome: &str) {
    RULE_OUTCOMES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a DNS lookup result.
pub fn record_dns_lookup(found: bool) {
    let result = if found { "found" } else { "absent" };
    DNS_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
}

/// Record a DNS record creation attempt.
pub fn record_dns_create(success: bool) {
    let status = if success { "success" } else { "failure" };
    DNS_RECORDS_CREATED_TOTAL.with_label_values(&[status]).inc();
}

/// Record an error
///
/// # Arguments
/// * `component` - Where the error occurred
/// * `reason` - Reason code (e.g. `ProviderAuthFailed`)
pub fn record_error(component: &str, reason: &str) {
    ERRORS_TOTAL.with_label_values(&[component, reason]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

// ============================================================================
// HTTP Endpoint
// ============================================================================

async fn metrics_handler() -> Response {
    match gather_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn healthz_handler() -> &'static str {
    "ok"
}

/// Router serving `/metrics` and `/healthz`.
pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
}

/// Serve [`router`] on `listener` until the task is dropped.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve_metrics(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "Serving metrics on /metrics");
    }
    axum::serve(listener, router()).await
}
