// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # swarmflare - Cloudflare DNS for Docker Swarm
//!
//! swarmflare watches Docker Swarm services for Traefik routing rules and
//! makes sure every routed hostname has a Cloudflare `A` record pointing at
//! the cluster's public address.
//!
//! ## Overview
//!
//! A service labelled
//!
//! ```text
//! traefik.http.routers.web.rule=Host(`app.example.com`)
//! traefik.http.routers.web.cloudflare.proxied=false
//! ```
//!
//! gets an unproxied `A` record `app.example.com` in the Cloudflare zone
//! configured for `example.com`. Records are only ever created: existing
//! records are left untouched and removed services keep their records.
//!
//! ## Modules
//!
//! - [`rules`] - Routing rule and proxy toggle extraction from labels
//! - [`domains`] - Domain suffix to Cloudflare zone resolution
//! - [`cloudflare`] - Cloudflare DNS record client
//! - [`state`] - Idempotency store
//! - [`orchestrator`] - Docker Engine and scripted event sources
//! - [`reconciler`] - Reconciliation engine and main loop
//! - [`config`] - Environment configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swarmflare::cloudflare::CloudflareClient;
//! use swarmflare::config::Config;
//! use swarmflare::orchestrator::DockerOrchestrator;
//! use swarmflare::reconciler::Reconciler;
//! use swarmflare::state::InMemoryReconciliationStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let orchestrator = DockerOrchestrator::new(
//!     config.docker_host.clone(),
//!     config.http_timeout,
//!     config.public_address,
//! )?;
//! let dns = CloudflareClient::new(config.cloudflare_api_url.clone(), config.http_timeout)?;
//!
//! let reconciler = Reconciler::new(
//!     Arc::new(orchestrator),
//!     Arc::new(dns),
//!     Arc::new(InMemoryReconciliationStore::new()),
//!     Arc::new(config.domains),
//! );
//! reconciler.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod cloudflare;
pub mod config;
pub mod constants;
pub mod domains;
pub mod errors;
pub mod http_errors;
pub mod labels;
pub mod metrics;
mod ordered;
pub mod orchestrator;
pub mod reconciler;
pub mod rules;
pub mod state;
pub mod status_reasons;
pub mod workload;

#[cfg(test)]
mod status_reasons_tests;
