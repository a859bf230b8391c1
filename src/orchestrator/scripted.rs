// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Scripted orchestrator for tests and dry runs.
//!
//! Holds an initial set of workloads and a fixed sequence of events. Each
//! event can install or remove a workload at the moment it is yielded, so
//! `get_workload` observes the same state a real engine would. The event
//! stream ends once the script is exhausted.
//!
//! ```rust
//! use swarmflare::orchestrator::{ScriptedEvent, ScriptedOrchestrator};
//! use swarmflare::workload::{Labels, WorkloadSnapshot};
//! use std::net::Ipv4Addr;
//!
//! let web = WorkloadSnapshot::new("svc1", "web", Labels::new());
//! let orchestrator = ScriptedOrchestrator::new(vec![])
//!     .with_events(vec![ScriptedEvent::create(web)])
//!     .with_public_address(Ipv4Addr::new(203, 0, 113, 10));
//! ```

use super::{EventStream, Orchestrator};
use crate::constants::UNSET_PUBLIC_ADDRESS;
use crate::errors::OrchestratorError;
use crate::status_reasons::REASON_UNREACHABLE;
use crate::workload::{WorkloadAction, WorkloadEvent, WorkloadSnapshot};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One step of the script.
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    event: WorkloadEvent,
    install: Option<WorkloadSnapshot>,
    uninstall: bool,
}

impl ScriptedEvent {
    /// Yield `event` without changing any workload.
    #[must_use]
    pub fn new(event: WorkloadEvent) -> Self {
        Self {
            event,
            install: None,
            uninstall: false,
        }
    }

    /// Install `snapshot` and yield a `create` event for it.
    #[must_use]
    pub fn create(snapshot: WorkloadSnapshot) -> Self {
        Self::installing(WorkloadAction::Create, snapshot)
    }

    /// Replace the workload with `snapshot` and yield an `update` event for it.
    #[must_use]
    pub fn update(snapshot: WorkloadSnapshot) -> Self {
        Self::installing(WorkloadAction::Update, snapshot)
    }

    /// Remove the workload `id` and yield a `remove` event for it.
    #[must_use]
    pub fn remove(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            event: WorkloadEvent::new(id, WorkloadAction::Remove).with_name(name),
            install: None,
            uninstall: true,
        }
    }

    fn installing(action: WorkloadAction, snapshot: WorkloadSnapshot) -> Self {
        Self {
            event: WorkloadEvent::new(snapshot.id.clone(), action).with_name(snapshot.name.clone()),
            install: Some(snapshot),
            uninstall: false,
        }
    }
}

#[derive(Debug, Default)]
struct Workloads(Vec<WorkloadSnapshot>);

impl Workloads {
    fn upsert(&mut self, snapshot: WorkloadSnapshot) {
        if let Some(existing) = self.0.iter_mut().find(|w| w.id == snapshot.id) {
            *existing = snapshot;
        } else {
            self.0.push(snapshot);
        }
    }

    fn remove(&mut self, id: &str) {
        self.0.retain(|w| w.id != id);
    }

    fn get(&self, id: &str) -> Option<&WorkloadSnapshot> {
        self.0.iter().find(|w| w.id == id)
    }
}

/// [`Orchestrator`] that replays a fixed script.
#[derive(Debug)]
pub struct ScriptedOrchestrator {
    workloads: Arc<Mutex<Workloads>>,
    script: Mutex<Vec<ScriptedEvent>>,
    public_address: Option<Ipv4Addr>,
    fail_subscribe: bool,
}

impl ScriptedOrchestrator {
    /// Start with `initial` workloads, no events, and the unset public address.
    #[must_use]
    pub fn new(initial: Vec<WorkloadSnapshot>) -> Self {
        let mut workloads = Workloads::default();
        for snapshot in initial {
            workloads.upsert(snapshot);
        }

        Self {
            workloads: Arc::new(Mutex::new(workloads)),
            script: Mutex::new(Vec::new()),
            public_address: Some(UNSET_PUBLIC_ADDRESS),
            fail_subscribe: false,
        }
    }

    /// Events yielded by the first subscription, in order.
    #[must_use]
    pub fn with_events(self, events: Vec<ScriptedEvent>) -> Self {
        *lock(&self.script) = events;
        self
    }

    #[must_use]
    pub fn with_public_address(mut self, address: Ipv4Addr) -> Self {
        self.public_address = Some(address);
        self
    }

    /// Make `cluster_public_address` return an error.
    #[must_use]
    pub fn failing_public_address(mut self) -> Self {
        self.public_address = None;
        self
    }

    /// Make `subscribe` return an error.
    #[must_use]
    pub fn failing_subscribe(mut self) -> Self {
        self.fail_subscribe = true;
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Orchestrator for ScriptedOrchestrator {
    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>, OrchestratorError> {
        Ok(lock(&*self.workloads).0.clone())
    }

    async fn subscribe(&self) -> Result<EventStream, OrchestratorError> {
        if self.fail_subscribe {
            return Err(OrchestratorError::Subscribe {
                reason: "scripted subscription failure".to_string(),
            });
        }

        // The script is consumed by the first subscription
        let script = std::mem::take(&mut *lock(&self.script));
        let workloads = Arc::clone(&self.workloads);

        Ok(stream::iter(script)
            .map(move |step| {
                let mut current = lock(&*workloads);
                if let Some(snapshot) = step.install {
                    current.upsert(snapshot);
                }
                if step.uninstall {
                    current.remove(&step.event.id);
                }
                Ok::<_, OrchestratorError>(step.event)
            })
            .boxed())
    }

    async fn get_workload(&self, id: &str) -> Result<WorkloadSnapshot, OrchestratorError> {
        lock(&*self.workloads)
            .get(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::WorkloadNotFound { id: id.to_string() })
    }

    async fn cluster_public_address(&self) -> Result<Ipv4Addr, OrchestratorError> {
        self.public_address
            .ok_or_else(|| OrchestratorError::Connection {
                endpoint: "scripted".to_string(),
                reason: REASON_UNREACHABLE,
                message: "public address lookup failed".to_string(),
            })
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod scripted_tests;
