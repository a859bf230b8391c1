// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `state.rs`

use super::*;
use std::sync::Arc;

#[test]
fn test_key_display() {
    let key = IdempotencyKey::new("web", "app.example.com");
    assert_eq!(key.to_string(), "web:app.example.com");
}

#[test]
fn test_store_starts_empty() {
    let store = InMemoryReconciliationStore::new();
    assert!(store.is_empty());
    assert!(!store.contains(&IdempotencyKey::new("web", "app.example.com")));
}

#[test]
fn test_mark_satisfied_is_idempotent() {
    let store = InMemoryReconciliationStore::new();
    let key = IdempotencyKey::new("web", "app.example.com");

    store.mark_satisfied(key.clone());
    store.mark_satisfied(key.clone());

    assert!(store.contains(&key));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_keys_are_scoped_by_workload() {
    let store = InMemoryReconciliationStore::new();
    store.mark_satisfied(IdempotencyKey::new("web", "app.example.com"));

    assert!(!store.contains(&IdempotencyKey::new("api", "app.example.com")));
    assert!(!store.contains(&IdempotencyKey::new("web", "www.example.com")));
}

#[test]
fn test_store_shared_across_threads() {
    let store = Arc::new(InMemoryReconciliationStore::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store.mark_satisfied(IdempotencyKey::new("web", format!("h{i}.example.com")));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 4);
}
