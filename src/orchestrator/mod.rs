// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Orchestrator event sources.
//!
//! The reconciler only sees the [`Orchestrator`] trait. Two implementations
//! are provided:
//!
//! - [`docker::DockerOrchestrator`] talks to a Docker Engine over HTTP and
//!   streams Swarm service events.
//! - [`scripted::ScriptedOrchestrator`] replays a fixed listing and event
//!   script, for tests and dry runs.

pub mod docker;
pub mod scripted;

pub use docker::{DockerEndpoint, DockerOrchestrator};
pub use scripted::{ScriptedEvent, ScriptedOrchestrator};

use crate::errors::OrchestratorError;
use crate::workload::{WorkloadEvent, WorkloadSnapshot};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::net::Ipv4Addr;

/// Stream of workload events. Ends when the orchestrator closes it.
pub type EventStream = BoxStream<'static, Result<WorkloadEvent, OrchestratorError>>;

/// Source of workload snapshots and lifecycle events.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Snapshot of every running workload.
    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>, OrchestratorError>;

    /// Open the lifecycle event stream.
    async fn subscribe(&self) -> Result<EventStream, OrchestratorError>;

    /// Current snapshot of one workload.
    async fn get_workload(&self, id: &str) -> Result<WorkloadSnapshot, OrchestratorError>;

    /// Address new DNS records should point at; `0.0.0.0` when unknown.
    async fn cluster_public_address(&self) -> Result<Ipv4Addr, OrchestratorError>;
}
