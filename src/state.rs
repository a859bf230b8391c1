// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Idempotency state for the reconciler.
//!
//! The store remembers which `(service, hostname)` pairs already have a DNS
//! record, so repeated events for the same service cost no API calls. Keys
//! are added only after Cloudflare confirmed a record exists or accepted a new
//! one, and are never removed for the lifetime of the process.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Identifies one hostname routed to one workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey {
    pub workload: String,
    pub hostname: String,
}

impl IdempotencyKey {
    pub fn new(workload: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            workload: workload.into(),
            hostname: hostname.into(),
        }
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workload, self.hostname)
    }
}

/// Set of keys known to have a matching DNS record.
///
/// Implementations must be safe to share across tasks.
pub trait ReconciliationStore: Send + Sync {
    /// True if `key` was already marked satisfied.
    fn contains(&self, key: &IdempotencyKey) -> bool;

    /// Mark `key` satisfied. Call only after a confirmed lookup or a successful create.
    fn mark_satisfied(&self, key: IdempotencyKey);
}

/// Process-lifetime in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryReconciliationStore {
    keys: Mutex<HashSet<IdempotencyKey>>,
}

impl InMemoryReconciliationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<IdempotencyKey>> {
        // The set stays consistent even if a holder panicked
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReconciliationStore for InMemoryReconciliationStore {
    fn contains(&self, key: &IdempotencyKey) -> bool {
        self.lock().contains(key)
    }

    fn mark_satisfied(&self, key: IdempotencyKey) {
        self.lock().insert(key);
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
