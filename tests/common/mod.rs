// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use swarmflare::cloudflare::CloudflareClient;
use swarmflare::domains::{DomainConfig, DomainTable};
use swarmflare::orchestrator::Orchestrator;
use swarmflare::reconciler::Reconciler;
use swarmflare::state::InMemoryReconciliationStore;
use swarmflare::workload::{Labels, WorkloadSnapshot};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ZONE_ID: &str = "zone-example";
pub const API_TOKEN: &str = "token-example";
pub const RECORDS_PATH: &str = "/client/v4/zones/zone-example/dns_records";

/// Table with a single `example.com` zone.
pub fn domain_table() -> DomainTable {
    DomainTable::new([("example.com", DomainConfig::new(ZONE_ID, API_TOKEN))])
}

/// Cloudflare client pointed at the mock server.
pub fn cloudflare_client(server: &MockServer) -> CloudflareClient {
    let base = Url::parse(&format!("{}/client/v4/", server.uri())).expect("valid mock URL");
    CloudflareClient::new(base, Duration::from_secs(5)).expect("client builds")
}

/// Reconciler using the real Cloudflare client against `server`.
pub fn reconciler(orchestrator: impl Orchestrator + 'static, server: &MockServer) -> Reconciler {
    Reconciler::new(
        Arc::new(orchestrator),
        Arc::new(cloudflare_client(server)),
        Arc::new(InMemoryReconciliationStore::new()),
        Arc::new(domain_table()),
    )
}

/// Service snapshot with the given labels, in order.
pub fn service(id: &str, name: &str, labels: &[(&str, &str)]) -> WorkloadSnapshot {
    let labels: Labels = labels.iter().copied().collect();
    WorkloadSnapshot::new(id, name, labels)
}

/// Answer lookups with `records`.
pub async fn mount_lookup(server: &MockServer, records: Value) {
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": records
        })))
        .mount(server)
        .await;
}

/// Accept every record creation.
pub async fn mount_create_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": {"id": "created", "name": "x", "type": "A", "content": "0.0.0.0", "proxied": true, "ttl": 1}
        })))
        .mount(server)
        .await;
}

/// JSON bodies of every record creation the server received.
pub async fn created_records(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.method.as_str() == "POST")
        .map(|request| serde_json::from_slice(&request.body).expect("JSON body"))
        .collect()
}

/// Number of requests of any kind the server received.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}
