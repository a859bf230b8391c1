// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Routing-rule extraction from service labels.
//!
//! Traefik routers are declared with labels such as:
//!
//! ```text
//! traefik.http.routers.web.rule=Host(`app.example.com`)
//! traefik.http.routers.web.cloudflare.proxied=false
//! ```
//!
//! This module turns a label set into the ordered list of rule expressions and
//! the ordered list of per-router proxy toggles, and pulls the hostname out of
//! a single rule. Everything here is a pure function of its input.
//!
//! # Example
//!
//! ```rust
//! use swarmflare::rules::{extract_hostname, extract_routing};
//! use swarmflare::workload::Labels;
//!
//! let labels: Labels = [
//!     ("traefik.http.routers.web.rule", "Host(`app.example.com`)"),
//!     ("traefik.http.routers.web.cloudflare.proxied", "false"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let facts = extract_routing(&labels);
//! assert_eq!(facts.rules.len(), 1);
//! assert_eq!(
//!     extract_hostname(facts.rules[0].expression()).as_deref(),
//!     Some("app.example.com")
//! );
//! assert!(!facts.proxy_settings.resolve(facts.rules[0].expression(), "web"));
//! ```

use crate::labels::{
    DEFAULT_PROXIED, HOST_MATCHER_TOKEN, PROXY_TOGGLE_SUFFIX, PROXY_TOGGLE_TRUE,
    ROUTER_RULE_MARKER,
};
use crate::workload::Labels;
use regex::Regex;
use std::sync::LazyLock;

/// ``Host(`app.example.com`)``
static BACKTICK_HOST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Host\(`([^`]+)`\)").unwrap());

/// `Host("app.example.com")`
static QUOTED_HOST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Host\("([^"]+)"\)"#).unwrap());

/// A raw router rule expression taken from a service label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    /// Label key the rule came from
    pub label: String,
    expression: String,
}

impl RoutingRule {
    pub fn new(label: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expression: expression.into(),
        }
    }

    /// The rule expression, e.g. ``Host(`app.example.com`) && PathPrefix(`/api`)``
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Hostname of the first host matcher in this rule.
    #[must_use]
    pub fn hostname(&self) -> Option<String> {
        extract_hostname(&self.expression)
    }
}

/// Proxy toggle for one router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySetting {
    pub router_name: String,
    pub proxied: bool,
}

/// Proxy toggles of one service, in label order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings(Vec<ProxySetting>);

impl ProxySettings {
    /// Record a toggle; a later label for the same router overrides the value
    /// but keeps the router's original position.
    pub fn push(&mut self, router_name: impl Into<String>, proxied: bool) {
        let router_name = router_name.into();
        if let Some(existing) = self.0.iter_mut().find(|s| s.router_name == router_name) {
            existing.proxied = proxied;
        } else {
            self.0.push(ProxySetting {
                router_name,
                proxied,
            });
        }
    }

    /// Decide whether a rule's record should be proxied.
    ///
    /// The first setting whose router name occurs in the rule expression or in
    /// the workload name wins. Without a match the record is proxied.
    #[must_use]
    pub fn resolve(&self, rule: &str, workload_name: &str) -> bool {
        self.0
            .iter()
            .find(|s| rule.contains(&s.router_name) || workload_name.contains(&s.router_name))
            .map_or(DEFAULT_PROXIED, |s| s.proxied)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxySetting> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Routing facts extracted from one service's labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingFacts {
    pub rules: Vec<RoutingRule>,
    pub proxy_settings: ProxySettings,
}

/// Extract router rules and proxy toggles from service labels.
///
/// A label is a rule when its key contains `.rule` and its value contains
/// `Host(`. A label is a proxy toggle when its key ends with
/// `.cloudflare.proxied`; the router is the key segment right before that
/// suffix, and only the value `true` (any case) enables the proxy.
#[must_use]
pub fn extract_routing(labels: &Labels) -> RoutingFacts {
    let mut facts = RoutingFacts::default();

    for (key, value) in labels.iter() {
        if key.contains(ROUTER_RULE_MARKER) && value.contains(HOST_MATCHER_TOKEN) {
            facts.rules.push(RoutingRule::new(key, value));
        }

        if let Some(router_name) = proxy_toggle_router(key) {
            facts
                .proxy_settings
                .push(router_name, value.eq_ignore_ascii_case(PROXY_TOGGLE_TRUE));
        }
    }

    facts
}

/// Router name of a proxy toggle label, or `None` if `key` is not one.
///
/// `traefik.http.routers.web.cloudflare.proxied` yields `web`.
#[must_use]
pub fn proxy_toggle_router(key: &str) -> Option<&str> {
    let prefix = key.strip_suffix(PROXY_TOGGLE_SUFFIX)?;
    // An empty router name would be a substring of every rule
    prefix.rsplit('.').next().filter(|name| !name.is_empty())
}

/// Extract the hostname from a rule expression.
///
/// Tries the backtick form first, then the double-quoted form. Only the first
/// host matcher is returned; `Host(`a`) || Host(`b`)` yields `a`.
#[must_use]
pub fn extract_hostname(rule: &str) -> Option<String> {
    BACKTICK_HOST_PATTERN
        .captures(rule)
        .or_else(|| QUOTED_HOST_PATTERN.captures(rule))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod rules_tests;
