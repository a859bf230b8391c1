// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `workload.rs`

use super::*;

#[test]
fn test_labels_deserialize_in_document_order() {
    let labels: Labels = serde_json::from_str(r#"{"z": "1", "a": "2", "m": "3"}"#).unwrap();
    let keys: Vec<&str> = labels.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_labels_null_is_empty() {
    let labels: Labels = serde_json::from_str("null").unwrap();
    assert!(labels.is_empty());
}

#[test]
fn test_labels_insert_replaces_in_place() {
    let mut labels: Labels = [("a", "1"), ("b", "2")].into_iter().collect();
    labels.insert("a", "3");

    assert_eq!(labels.len(), 2);
    assert_eq!(labels.get("a"), Some("3"));
    assert_eq!(labels.iter().next(), Some(("a", "3")));
}

#[test]
fn test_action_parse() {
    assert_eq!(WorkloadAction::parse("create"), Some(WorkloadAction::Create));
    assert_eq!(WorkloadAction::parse("update"), Some(WorkloadAction::Update));
    assert_eq!(WorkloadAction::parse("remove"), Some(WorkloadAction::Remove));
    assert_eq!(WorkloadAction::parse("start"), None);
    assert_eq!(WorkloadAction::Update.to_string(), "update");
}

#[test]
fn test_event_display_name_falls_back_to_id() {
    let event = WorkloadEvent::new("abc123", WorkloadAction::Create);
    assert_eq!(event.display_name(), "abc123");
    assert_eq!(event.with_name("web").display_name(), "web");
}
