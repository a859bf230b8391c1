// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `rules.rs`

use super::*;

fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs.iter().copied().collect()
}

#[test]
fn test_extract_routing_without_rule_labels_is_empty() {
    let labels = labels(&[
        ("com.docker.stack.namespace", "web"),
        ("traefik.enable", "true"),
        ("traefik.http.services.web.loadbalancer.server.port", "8080"),
    ]);

    let facts = extract_routing(&labels);

    assert!(facts.rules.is_empty());
    assert!(facts.proxy_settings.is_empty());
}

#[test]
fn test_extract_routing_empty_labels() {
    let facts = extract_routing(&Labels::new());
    assert_eq!(facts, RoutingFacts::default());
}

#[test]
fn test_extract_routing_collects_host_rules_in_label_order() {
    let labels = labels(&[
        ("traefik.http.routers.b.rule", "Host(`b.example.com`)"),
        ("traefik.http.routers.api.rule", "PathPrefix(`/api`)"),
        ("traefik.http.routers.a.rule", "Host(`a.example.com`)"),
    ]);

    let facts = extract_routing(&labels);

    let expressions: Vec<&str> = facts.rules.iter().map(RoutingRule::expression).collect();
    assert_eq!(
        expressions,
        vec!["Host(`b.example.com`)", "Host(`a.example.com`)"]
    );
    assert_eq!(facts.rules[0].label, "traefik.http.routers.b.rule");
}

#[test]
fn test_extract_routing_reads_proxy_toggles() {
    let labels = labels(&[
        ("traefik.http.routers.web.cloudflare.proxied", "false"),
        ("traefik.http.routers.admin.cloudflare.proxied", "TRUE"),
        ("traefik.http.routers.legacy.cloudflare.proxied", "yes"),
    ]);

    let facts = extract_routing(&labels);

    let settings: Vec<(&str, bool)> = facts
        .proxy_settings
        .iter()
        .map(|s| (s.router_name.as_str(), s.proxied))
        .collect();
    assert_eq!(
        settings,
        vec![("web", false), ("admin", true), ("legacy", false)]
    );
    assert!(facts.rules.is_empty());
}

#[test]
fn test_proxy_toggle_router_name() {
    assert_eq!(
        proxy_toggle_router("traefik.http.routers.web.cloudflare.proxied"),
        Some("web")
    );
    assert_eq!(proxy_toggle_router("web.cloudflare.proxied"), Some("web"));
    assert_eq!(proxy_toggle_router("traefik.http.routers.web.rule"), None);
    assert_eq!(proxy_toggle_router(".cloudflare.proxied"), None);
}

#[test]
fn test_extract_hostname_backtick() {
    assert_eq!(
        extract_hostname("Host(`app.example.com`)").as_deref(),
        Some("app.example.com")
    );
}

#[test]
fn test_extract_hostname_double_quoted() {
    assert_eq!(
        extract_hostname(r#"Host("app.example.com")"#).as_deref(),
        Some("app.example.com")
    );
}

#[test]
fn test_extract_hostname_prefers_backtick_form() {
    let rule = r#"Host("quoted.example.com") || Host(`tick.example.com`)"#;
    assert_eq!(extract_hostname(rule).as_deref(), Some("tick.example.com"));
}

#[test]
fn test_extract_hostname_returns_first_matcher_only() {
    let rule = "Host(`a.example.com`) || Host(`b.example.com`)";
    assert_eq!(extract_hostname(rule).as_deref(), Some("a.example.com"));
}

#[test]
fn test_extract_hostname_combined_rule() {
    let rule = "Host(`api.example.com`) && PathPrefix(`/v1`)";
    assert_eq!(extract_hostname(rule).as_deref(), Some("api.example.com"));
}

#[test]
fn test_extract_hostname_no_match() {
    assert_eq!(extract_hostname("PathPrefix(`/api`)"), None);
    assert_eq!(extract_hostname("Host(``)"), None);
    assert_eq!(extract_hostname("HostRegexp(`{sub:[a-z]+}.example.com`)"), None);
    assert_eq!(extract_hostname(""), None);
}

#[test]
fn test_resolve_defaults_to_proxied() {
    let settings = ProxySettings::default();
    assert!(settings.resolve("Host(`app.example.com`)", "web"));
}

#[test]
fn test_resolve_matches_workload_name() {
    let mut settings = ProxySettings::default();
    settings.push("web", false);

    assert!(!settings.resolve("Host(`app.example.com`)", "stack_web"));
}

#[test]
fn test_resolve_matches_rule_expression() {
    let mut settings = ProxySettings::default();
    settings.push("docs", false);

    assert!(!settings.resolve("Host(`docs.example.com`)", "frontend"));
    assert!(settings.resolve("Host(`app.example.com`)", "frontend"));
}

#[test]
fn test_resolve_first_match_wins() {
    let mut settings = ProxySettings::default();
    settings.push("app", false);
    settings.push("example", true);

    assert!(!settings.resolve("Host(`app.example.com`)", "svc"));

    let mut reversed = ProxySettings::default();
    reversed.push("example", true);
    reversed.push("app", false);

    assert!(reversed.resolve("Host(`app.example.com`)", "svc"));
}

#[test]
fn test_push_same_router_keeps_position() {
    let mut settings = ProxySettings::default();
    settings.push("web", true);
    settings.push("api", true);
    settings.push("web", false);

    let names: Vec<&str> = settings.iter().map(|s| s.router_name.as_str()).collect();
    assert_eq!(names, vec!["web", "api"]);
    assert!(!settings.resolve("Host(`web.example.com`)", "svc"));
}

#[test]
fn test_routing_rule_hostname() {
    let rule = RoutingRule::new("traefik.http.routers.web.rule", "Host(`x.example.com`)");
    assert_eq!(rule.hostname().as_deref(), Some("x.example.com"));
}
