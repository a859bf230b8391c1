// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service label markers understood by the rule extractor.
//!
//! Traefik reads its routing configuration from Swarm service labels such as
//! `traefik.http.routers.web.rule`. swarmflare reads the same labels, plus one
//! label of its own that toggles the Cloudflare proxy per router.

// ============================================================================
// Traefik Labels
// ============================================================================

/// Substring identifying a Traefik router rule label (e.g., `traefik.http.routers.web.rule`)
pub const ROUTER_RULE_MARKER: &str = ".rule";

/// Token a rule value must contain to be considered a host-routing rule
pub const HOST_MATCHER_TOKEN: &str = "Host(";

// ============================================================================
// swarmflare Labels
// ============================================================================

/// Suffix of the per-router Cloudflare proxy toggle
/// (e.g., `traefik.http.routers.web.cloudflare.proxied=false`)
pub const PROXY_TOGGLE_SUFFIX: &str = ".cloudflare.proxied";

/// Value enabling the proxy (compared case-insensitively)
pub const PROXY_TOGGLE_TRUE: &str = "true";

/// Proxy setting applied when no toggle matches a rule
pub const DEFAULT_PROXIED: bool = true;
