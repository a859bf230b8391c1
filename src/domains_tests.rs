// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `domains.rs`

use super::*;

fn build_table(entries: &[(&str, &str)]) -> DomainTable {
    DomainTable::new(
        entries
            .iter()
            .map(|(domain, zone)| (*domain, DomainConfig::new(*zone, format!("token-{zone}")))),
    )
}

#[test]
fn test_resolve_exact_and_subdomain() {
    let table = build_table(&[("example.com", "z1")]);

    assert_eq!(table.resolve("example.com").unwrap().zone_id, "z1");
    assert_eq!(table.resolve("app.example.com").unwrap().zone_id, "z1");
    assert_eq!(table.resolve("a.b.example.com").unwrap().zone_id, "z1");
}

#[test]
fn test_resolve_no_match() {
    let table = build_table(&[("example.com", "z1"), ("example.org", "z2")]);

    assert!(table.resolve("sub.unknown.tld").is_none());
    assert!(table.resolve("example.com.evil.net").is_none());
}

#[test]
fn test_resolve_empty_table() {
    assert!(DomainTable::default().resolve("app.example.com").is_none());
}

#[test]
fn test_resolve_first_entry_wins_over_longer_suffix() {
    let table = build_table(&[("example.com", "parent"), ("api.example.com", "child")]);
    assert_eq!(table.resolve("x.api.example.com").unwrap().zone_id, "parent");

    let reversed = build_table(&[("api.example.com", "child"), ("example.com", "parent")]);
    assert_eq!(reversed.resolve("x.api.example.com").unwrap().zone_id, "child");
}

#[test]
fn test_resolve_is_plain_string_suffix() {
    // No label boundary check: "myexample.com" ends with "example.com"
    let table = build_table(&[("example.com", "z1")]);
    assert_eq!(table.resolve("myexample.com").unwrap().zone_id, "z1");
}

#[test]
fn test_from_json_preserves_document_order() {
    let json = r#"{
        "zeta.com": {"zone_id": "z", "api_key": "kz"},
        "alpha.com": {"zone_id": "a", "api_key": "ka"},
        "beta.com": {"zone_id": "b", "api_key": "kb"}
    }"#;

    let table = DomainTable::from_json(json).unwrap();

    let domains: Vec<&str> = table.domains().collect();
    assert_eq!(domains, vec!["zeta.com", "alpha.com", "beta.com"]);
    assert_eq!(table.resolve("www.alpha.com").unwrap().api_token, "ka");
}

#[test]
fn test_from_json_rejects_wrong_shapes() {
    assert!(DomainTable::from_json("not json").is_err());
    assert!(DomainTable::from_json("[]").is_err());
    assert!(DomainTable::from_json(r#"{"example.com": {"zone_id": "z"}}"#).is_err());
}

#[test]
fn test_from_json_empty_object() {
    let table = DomainTable::from_json("{}").unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_domain_config_debug_redacts_token() {
    let config = DomainConfig::new("zone-1", "super-secret");
    let debug = format!("{config:?}");

    assert!(debug.contains("zone-1"));
    assert!(!debug.contains("super-secret"));
}
